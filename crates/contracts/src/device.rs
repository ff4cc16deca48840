//! Devices contract.
//!
//! Devices are keyed under the `device` namespace by a hash of their hostname
//! plus a unique suffix. Every state change emits a `devices.*` event after
//! the record is committed:
//!
//! | operation | event |
//! |---|---|
//! | register (no id in payload) | `devices.inserted` |
//! | register (id in payload), update | `devices.updated` |
//! | unbind, remove_all | `devices.removed` |

use tracing::Span;

use chainmetric_core::{Document, DomainError, Entity, Merge, Validate};
use chainmetric_ledger::Ledger;
use chainmetric_models::{Device, DeviceUpdateRequest};

use crate::admin::AdminCapability;
use crate::error::{ContractError, ContractResult};
use crate::keys::{self, KeyScheme, SuffixGenerator, TimeOrderedSuffix};
use crate::{notify, repository};

pub const INSERTED: &str = "devices.inserted";
pub const UPDATED: &str = "devices.updated";
pub const REMOVED: &str = "devices.removed";

/// Device repository over an injected ledger.
#[derive(Debug)]
pub struct DeviceRepository<L, G = TimeOrderedSuffix> {
    ledger: L,
    keys: KeyScheme<G>,
    admin: Option<AdminCapability>,
    span: Span,
}

impl<L: Ledger> DeviceRepository<L> {
    pub fn new(ledger: L) -> Self {
        Self::with_key_scheme(ledger, KeyScheme::default())
    }
}

impl<L, G> DeviceRepository<L, G>
where
    L: Ledger,
    G: SuffixGenerator,
{
    pub fn with_key_scheme(ledger: L, keys: KeyScheme<G>) -> Self {
        Self {
            ledger,
            keys,
            admin: None,
            span: tracing::info_span!("contract", name = "devices"),
        }
    }

    /// Attaches every log record of this repository to `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_admin(mut self, admin: Option<AdminCapability>) -> Self {
        self.admin = admin;
        self
    }

    pub fn admin(&self) -> Option<AdminCapability> {
        self.admin
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn retrieve(&self, id: &str) -> ContractResult<Device> {
        let _entered = self.span.enter();
        repository::retrieve(&self.ledger, id)
    }

    /// Every device in the `device` namespace; undecodable records are skipped.
    pub fn all(&self) -> ContractResult<Vec<Device>> {
        let _entered = self.span.enter();
        let iter = self
            .ledger
            .state_by_partial_composite_key(Device::NAMESPACE, &[])
            .inspect_err(|err| tracing::error!(error = %err, "failed to read from world state"))?;

        Ok(repository::collect(iter))
    }

    /// Creates or overwrites a device from a full document.
    ///
    /// A payload without an id is a creation: a new id is minted and
    /// `devices.inserted` is emitted. A payload carrying an id is written under
    /// that id and emits `devices.updated`.
    pub fn register(&self, payload: &[u8]) -> ContractResult<String> {
        let _entered = self.span.enter();

        let mut device = Device::decode(payload).map_err(|err| {
            tracing::warn!(error = %err, "failed to deserialize request");
            ContractError::Deserialization(err)
        })?;

        let event = if device.has_id() {
            UPDATED
        } else {
            let host = keys::hash(&device.hostname);
            let id = self
                .keys
                .mint(&self.ledger, Device::NAMESPACE, &[host.as_str()])
                .inspect_err(|err| tracing::error!(error = %err, "failed to generate composite key"))?;
            device.assign_id(id);
            INSERTED
        };

        device
            .validate()
            .map_err(|err| ContractError::validation(Device::KIND, err))?;

        notify::save(&self.ledger, &device, &[event])
            .inspect_err(|err| tracing::error!(error = %err, "failed saving device"))?;

        tracing::info!(id = %device.id.escape_debug(), event, "device registered");
        Ok(device.id)
    }

    /// Applies a partial update to an existing device and returns the result.
    pub fn update(&self, id: &str, payload: &[u8]) -> ContractResult<Device> {
        let _entered = self.span.enter();

        if id.is_empty() {
            return Err(ContractError::validation(Device::KIND, DomainError::required("id")));
        }

        let mut device: Device = repository::retrieve(&self.ledger, id)?;

        let request = DeviceUpdateRequest::decode(payload).map_err(|err| {
            tracing::warn!(error = %err, "failed to deserialize request");
            ContractError::Deserialization(err)
        })?;

        request.merge_into(&mut device);
        debug_assert_eq!(device.id, id);

        device
            .validate()
            .map_err(|err| ContractError::validation(Device::KIND, err))?;

        notify::save(&self.ledger, &device, &[UPDATED])
            .inspect_err(|err| tracing::error!(error = %err, "failed to update device"))?;

        Ok(device)
    }

    pub fn exists(&self, id: &str) -> ContractResult<bool> {
        let _entered = self.span.enter();
        repository::exists(&self.ledger, id)
    }

    /// Removes a device and emits `devices.removed` carrying its id.
    pub fn unbind(&self, id: &str) -> ContractResult<()> {
        let _entered = self.span.enter();

        repository::remove::<Device, _>(&self.ledger, id)?;
        notify::notify(&self.ledger, &[REMOVED], &Device::tombstone(id).encode());

        tracing::info!(id = %id.escape_debug(), "device unbound");
        Ok(())
    }

    /// Removes every device in the namespace. Not atomic: per-record failures
    /// are logged and skipped. Returns the number of devices removed.
    pub fn remove_all(&self, _admin: &AdminCapability) -> ContractResult<usize> {
        let _entered = self.span.enter();

        let iter = self
            .ledger
            .state_by_partial_composite_key(Device::NAMESPACE, &[])
            .inspect_err(|err| tracing::error!(error = %err, "failed to read from world state"))?;

        let removed = repository::purge(&self.ledger, iter, |key| {
            notify::notify(&self.ledger, &[REMOVED], &Device::tombstone(key).encode());
        });

        tracing::warn!(removed, "removed all devices");
        Ok(removed)
    }
}
