use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use chainmetric_core::{Document, DomainError, DomainResult, Entity, Merge, Validate};

use crate::metric::Metric;

/// Connectivity state last reported for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Online,
    Offline,
    Disconnected,
}

/// A sensing device bound to the network.
///
/// Every attribute except `hostname` is optional; absent attributes are left
/// out of the encoded document entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mac: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub profile: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supports: Vec<Metric>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub holder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<DeviceState>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
}

impl Device {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }

    /// A document carrying only the identifier, used for removal notifications.
    pub fn tombstone(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

impl Document for Device {}

impl Entity for Device {
    const NAMESPACE: &'static str = "device";
    const KIND: &'static str = "device";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Validate for Device {
    fn validate(&self) -> DomainResult<()> {
        if self.hostname.trim().is_empty() {
            return Err(DomainError::required("hostname"));
        }

        if !self.ip.is_empty() && self.ip.parse::<IpAddr>().is_err() {
            return Err(DomainError::invalid_field(
                "ip",
                format!("{:?} is not an IP address", self.ip),
            ));
        }

        if !self.mac.is_empty() && !is_mac_address(&self.mac) {
            return Err(DomainError::invalid_field(
                "mac",
                format!("{:?} is not a MAC address", self.mac),
            ));
        }

        Ok(())
    }
}

fn is_mac_address(value: &str) -> bool {
    let octets: Vec<&str> = value.split(':').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Partial update for an existing [`Device`].
///
/// Only attributes present in the request are applied. The identifier is not
/// part of the request; an `id` field in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports: Option<Vec<Metric>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<DeviceState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Document for DeviceUpdateRequest {}

impl Merge<Device> for DeviceUpdateRequest {
    fn merge_into(&self, target: &mut Device) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        set(&mut target.ip, &self.ip);
        set(&mut target.mac, &self.mac);
        set(&mut target.name, &self.name);
        set(&mut target.hostname, &self.hostname);
        set(&mut target.profile, &self.profile);
        set(&mut target.supports, &self.supports);
        set(&mut target.holder, &self.holder);
        set(&mut target.location, &self.location);

        if self.state.is_some() {
            target.state = self.state;
        }
    }
}
