use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::iterator::{KeyValue, StateIter, StateQueryIterator};
use crate::store::{EventSink, StateStore};

/// An event attached to the ledger by a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
    pub name: String,
    pub payload: Vec<u8>,
    pub emitted_at: DateTime<Utc>,
}

/// Failures the in-memory ledger reports instead of serving a call.
///
/// Each slot, when set, is returned by every call of that kind until cleared.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub reads: Option<LedgerError>,
    pub writes: Option<LedgerError>,
    pub deletes: Option<LedgerError>,
    pub scans: Option<LedgerError>,
    pub events: Option<LedgerError>,
}

#[derive(Debug, Clone, Copy)]
enum Call {
    Read,
    Write,
    Delete,
    Scan,
    Event,
}

/// In-memory world state + event log.
///
/// Intended for tests/dev. Range queries serve a snapshot taken when the cursor
/// opens, and open cursors are counted so leaked iterators are observable.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<BTreeMap<String, Vec<u8>>>,
    events: Mutex<Vec<EmittedEvent>>,
    faults: RwLock<Faults>,
    open_cursors: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Replaces the active fault plan.
    pub fn inject(&self, faults: Faults) {
        if let Ok(mut active) = self.faults.write() {
            *active = faults;
        }
    }

    pub fn clear_faults(&self) {
        self.inject(Faults::default());
    }

    /// Number of range cursors handed out and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn events_named(&self, name: &str) -> Vec<EmittedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.state
            .read()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fault(&self, call: Call) -> Result<(), LedgerError> {
        let faults = self.faults.read().map_err(|_| LedgerError::poisoned())?;
        let slot = match call {
            Call::Read => &faults.reads,
            Call::Write => &faults.writes,
            Call::Delete => &faults.deletes,
            Call::Scan => &faults.scans,
            Call::Event => &faults.events,
        };
        match slot {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl StateStore for InMemoryLedger {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.fault(Call::Read)?;
        let state = self.state.read().map_err(|_| LedgerError::poisoned())?;
        Ok(state.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        self.fault(Call::Write)?;
        if key.is_empty() {
            return Err(LedgerError::InvalidKey("key must not be empty".to_string()));
        }

        let mut state = self.state.write().map_err(|_| LedgerError::poisoned())?;
        state.insert(key.to_string(), value.to_vec());
        tracing::debug!(key = %key.escape_debug(), bytes = value.len(), "state written");
        Ok(())
    }

    fn del_state(&self, key: &str) -> Result<(), LedgerError> {
        self.fault(Call::Delete)?;
        let mut state = self.state.write().map_err(|_| LedgerError::poisoned())?;
        state.remove(key);
        tracing::debug!(key = %key.escape_debug(), "state deleted");
        Ok(())
    }

    fn state_by_range(&self, start: &str, end: &str) -> Result<StateIter<'_>, LedgerError> {
        self.fault(Call::Scan)?;
        let state = self.state.read().map_err(|_| LedgerError::poisoned())?;

        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };

        let snapshot: Vec<KeyValue> = if !start.is_empty() && !end.is_empty() && start > end {
            Vec::new()
        } else {
            state
                .range::<str, _>((lower, upper))
                .map(|(key, value)| KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect()
        };

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(StateIter::new(SnapshotCursor {
            entries: snapshot.into_iter(),
            open_cursors: self.open_cursors.clone(),
        }))
    }
}

impl EventSink for InMemoryLedger {
    fn set_event(&self, name: &str, payload: &[u8]) -> Result<(), LedgerError> {
        self.fault(Call::Event)?;
        if name.is_empty() {
            return Err(LedgerError::Event("event name must not be empty".to_string()));
        }

        let mut events = self.events.lock().map_err(|_| LedgerError::poisoned())?;
        events.push(EmittedEvent {
            name: name.to_string(),
            payload: payload.to_vec(),
            emitted_at: Utc::now(),
        });
        Ok(())
    }
}

struct SnapshotCursor {
    entries: std::vec::IntoIter<KeyValue>,
    open_cursors: Arc<AtomicUsize>,
}

impl StateQueryIterator for SnapshotCursor {
    fn has_next(&self) -> bool {
        !self.entries.as_slice().is_empty()
    }

    fn next_entry(&mut self) -> Result<KeyValue, LedgerError> {
        self.entries
            .next()
            .ok_or_else(|| LedgerError::Iterator("cursor exhausted".to_string()))
    }

    fn close(&mut self) -> Result<(), LedgerError> {
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
