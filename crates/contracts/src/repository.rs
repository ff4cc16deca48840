//! Operations shared by every entity repository.

use chainmetric_core::Entity;
use chainmetric_ledger::{StateIter, StateStore};

use crate::error::{ContractError, ContractResult};

/// Single-record read: absent is `NotFound`, undecodable is fatal.
pub(crate) fn retrieve<E, S>(store: &S, id: &str) -> ContractResult<E>
where
    E: Entity,
    S: StateStore + ?Sized,
{
    let data = store.get_state(id).inspect_err(|err| {
        tracing::error!(id = %id.escape_debug(), error = %err, "failed to read from world state");
    })?;

    let Some(data) = data else {
        return Err(ContractError::not_found(E::KIND, id));
    };

    E::decode(&data).map_err(|source| ContractError::Decode {
        kind: E::KIND,
        id: id.to_string(),
        source,
    })
}

pub(crate) fn exists<S>(store: &S, id: &str) -> ContractResult<bool>
where
    S: StateStore + ?Sized,
{
    let data = store.get_state(id).inspect_err(|err| {
        tracing::error!(id = %id.escape_debug(), error = %err, "failed to read from world state");
    })?;
    Ok(data.is_some())
}

/// Deletes an existing record; `NotFound` when there is nothing to delete.
pub(crate) fn remove<E, S>(store: &S, id: &str) -> ContractResult<()>
where
    E: Entity,
    S: StateStore + ?Sized,
{
    if !exists(store, id)? {
        return Err(ContractError::not_found(E::KIND, id));
    }

    store.del_state(id).inspect_err(|err| {
        tracing::error!(id = %id.escape_debug(), error = %err, "failed to remove {}", E::KIND);
    })?;
    Ok(())
}

/// Drains a range cursor into entities.
///
/// Undecodable records are logged and skipped so one bad record cannot hide
/// the rest. A cursor error ends the scan with what was collected so far. The
/// cursor is closed when this returns.
pub(crate) fn collect<E>(iter: StateIter<'_>) -> Vec<E>
where
    E: Entity,
{
    let mut entities = Vec::new();
    let mut skipped = 0usize;

    for entry in iter {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "state cursor failed; listing truncated");
                break;
            }
        };

        match E::decode(&entry.value) {
            Ok(entity) => entities.push(entity),
            Err(err) => {
                skipped += 1;
                tracing::warn!(
                    key = %entry.key.escape_debug(),
                    error = %err,
                    "skipping undecodable {}",
                    E::KIND
                );
            }
        }
    }

    if skipped > 0 {
        tracing::info!(returned = entities.len(), skipped, "listing completed with skipped records");
    }
    entities
}

/// Deletes every key the cursor yields, continuing past per-record delete
/// failures. A cursor error ends the scan.
///
/// `on_removed` runs after each successful delete. Returns the number of keys
/// removed.
pub(crate) fn purge<S>(store: &S, iter: StateIter<'_>, mut on_removed: impl FnMut(&str)) -> usize
where
    S: StateStore + ?Sized,
{
    let mut removed = 0usize;

    for entry in iter {
        let key = match entry {
            Ok(entry) => entry.key,
            Err(err) => {
                tracing::warn!(error = %err, "state cursor failed; removal stopped");
                break;
            }
        };

        if let Err(err) = store.del_state(&key) {
            tracing::warn!(key = %key.escape_debug(), error = %err, "failed to remove state entry");
            continue;
        }

        removed += 1;
        on_removed(&key);
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainmetric_core::Document;
    use chainmetric_ledger::{InMemoryLedger, KeyValue, LedgerError, StateQueryIterator};
    use chainmetric_models::Device;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Yields `good` entries, then fails on every call while claiming more.
    struct BrokenCursor {
        good: Vec<KeyValue>,
        reads: Arc<AtomicUsize>,
    }

    impl StateQueryIterator for BrokenCursor {
        fn has_next(&self) -> bool {
            true
        }

        fn next_entry(&mut self) -> Result<KeyValue, LedgerError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.good
                .pop()
                .ok_or_else(|| LedgerError::Iterator("peer stream reset".to_string()))
        }

        fn close(&mut self) -> Result<(), LedgerError> {
            Ok(())
        }
    }

    fn entry(key: &str, hostname: &str) -> KeyValue {
        KeyValue {
            key: key.to_string(),
            value: Device::new(hostname).encode(),
        }
    }

    #[test]
    fn collect_stops_at_first_cursor_error() {
        let reads = Arc::new(AtomicUsize::new(0));
        let cursor = BrokenCursor {
            good: vec![entry("b", "b.local"), entry("a", "a.local")],
            reads: reads.clone(),
        };

        let devices: Vec<Device> = collect(StateIter::new(cursor));

        assert_eq!(devices.len(), 2);
        assert_eq!(reads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn collect_skips_undecodable_records_and_keeps_going() {
        let ledger = InMemoryLedger::new();
        ledger.put_state("a", b"{").unwrap();
        ledger.put_state("b", &Device::new("b.local").encode()).unwrap();

        let devices: Vec<Device> = collect(ledger.state_by_range("", "").unwrap());

        assert_eq!(devices.len(), 1);
        assert_eq!(ledger.open_cursors(), 0);
    }

    #[test]
    fn purge_stops_at_first_cursor_error() {
        let ledger = InMemoryLedger::new();
        ledger.put_state("a", b"{}").unwrap();
        let reads = Arc::new(AtomicUsize::new(0));
        let cursor = BrokenCursor {
            good: vec![entry("a", "a.local")],
            reads: reads.clone(),
        };

        let mut seen = Vec::new();
        let removed = purge(&ledger, StateIter::new(cursor), |key| seen.push(key.to_string()));

        assert_eq!(removed, 1);
        assert_eq!(seen, vec!["a".to_string()]);
        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert!(ledger.is_empty());
    }
}
