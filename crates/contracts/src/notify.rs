//! Save protocol: commit the record, then notify.
//!
//! The two phases are independent. A failed commit aborts the operation and
//! nothing is emitted. A failed notification is logged and reported in the
//! [`NotifyReport`] but never undoes or fails the committed write.

use chainmetric_core::Entity;
use chainmetric_ledger::{EventSink, Ledger, LedgerError, StateStore};

use crate::error::{ContractError, ContractResult};

/// Outcome of the notify phase.
#[derive(Debug, Default)]
pub struct NotifyReport {
    pub emitted: Vec<String>,
    pub failed: Vec<ContractError>,
}

impl NotifyReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Phase one: write the entity under its id.
pub fn commit<E, S>(store: &S, entity: &E) -> ContractResult<()>
where
    E: Entity,
    S: StateStore + ?Sized,
{
    if !entity.has_id() {
        return Err(ContractError::UnassignedId(E::KIND));
    }

    store.put_state(entity.id(), &entity.encode())?;
    Ok(())
}

/// Phase two: emit every event with the same payload, best-effort.
pub fn notify<K>(sink: &K, events: &[&str], payload: &[u8]) -> NotifyReport
where
    K: EventSink + ?Sized,
{
    let mut report = NotifyReport::default();

    for event in events {
        match sink.set_event(event, payload) {
            Ok(()) => report.emitted.push((*event).to_string()),
            Err(source) => {
                tracing::warn!(event = %event, error = %source, "failed to emit event");
                report.failed.push(notify_failure(event, source));
            }
        }
    }

    report
}

/// Commit then notify; only the commit decides the result.
pub fn save<E, L>(ledger: &L, entity: &E, events: &[&str]) -> ContractResult<NotifyReport>
where
    E: Entity,
    L: Ledger + ?Sized,
{
    commit(ledger, entity)?;

    if events.is_empty() {
        return Ok(NotifyReport::default());
    }
    Ok(notify(ledger, events, &entity.encode()))
}

fn notify_failure(event: &str, source: LedgerError) -> ContractError {
    ContractError::Notify {
        event: event.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainmetric_core::Document;
    use chainmetric_ledger::{Faults, InMemoryLedger};
    use chainmetric_models::Device;

    fn device(id: &str) -> Device {
        let mut device = Device::new("probe-01.local");
        device.id = id.to_string();
        device
    }

    #[test]
    fn commit_requires_an_id() {
        let ledger = InMemoryLedger::new();
        let err = commit(&ledger, &device("")).unwrap_err();

        assert!(matches!(err, ContractError::UnassignedId("device")));
        assert!(ledger.is_empty());
    }

    #[test]
    fn save_emits_each_event_with_the_encoded_entity() {
        let ledger = InMemoryLedger::new();
        let entity = device("dev-1");

        let report = save(&ledger, &entity, &["devices.updated", "devices.audited"]).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.emitted, vec!["devices.updated", "devices.audited"]);
        let events = ledger.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.payload == entity.encode()));
    }

    #[test]
    fn notify_failure_does_not_fail_the_save() {
        let ledger = InMemoryLedger::new();
        ledger.inject(Faults {
            events: Some(LedgerError::Event("sink offline".to_string())),
            ..Faults::default()
        });

        let report = save(&ledger, &device("dev-1"), &["devices.inserted"]).unwrap();

        assert_eq!(report.failed.len(), 1);
        assert!(matches!(&report.failed[0], ContractError::Notify { event, .. } if event == "devices.inserted"));
        assert!(ledger.get_state("dev-1").unwrap().is_some());
    }

    #[test]
    fn failed_commit_emits_nothing() {
        let ledger = InMemoryLedger::new();
        ledger.inject(Faults {
            writes: Some(LedgerError::Conflict("phantom read".to_string())),
            ..Faults::default()
        });

        let err = save(&ledger, &device("dev-1"), &["devices.inserted"]).unwrap_err();

        assert!(matches!(err, ContractError::Store(LedgerError::Conflict(_))));
        assert!(ledger.events().is_empty());
    }
}
