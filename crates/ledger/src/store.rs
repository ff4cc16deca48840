//! Ledger capability traits.
//!
//! Contracts only ever see these traits. A real deployment wires them to the
//! peer's transaction stub; tests use [`crate::InMemoryLedger`].

use std::sync::Arc;

use crate::composite::{self, MAX_UNICODE_RUNE};
use crate::error::LedgerError;
use crate::iterator::StateIter;

/// Transactional key-value world state.
///
/// ## Range semantics
///
/// - `start` is inclusive and `end` exclusive.
/// - An empty `start` begins at the first key; an empty `end` runs to the last.
/// - Conflicts between concurrent writers are detected by the ledger at commit
///   time and surface as [`LedgerError::Conflict`].
pub trait StateStore: Send + Sync {
    /// Returns `None` when no value is stored under `key`.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), LedgerError>;

    fn del_state(&self, key: &str) -> Result<(), LedgerError>;

    fn state_by_range(&self, start: &str, end: &str) -> Result<StateIter<'_>, LedgerError>;

    /// Iterates every key sharing the composite prefix over `namespace` and `parts`.
    fn state_by_partial_composite_key(
        &self,
        namespace: &str,
        parts: &[&str],
    ) -> Result<StateIter<'_>, LedgerError> {
        let start = self.create_composite_key(namespace, parts)?;
        let mut end = start.clone();
        end.push(MAX_UNICODE_RUNE);
        self.state_by_range(&start, &end)
    }

    fn create_composite_key(&self, namespace: &str, parts: &[&str]) -> Result<String, LedgerError> {
        composite::create_composite_key(namespace, parts)
    }
}

/// Fire-and-forget notification channel attached to the transaction.
pub trait EventSink: Send + Sync {
    fn set_event(&self, name: &str, payload: &[u8]) -> Result<(), LedgerError>;
}

/// Full capability surface handed to a contract per invocation.
pub trait Ledger: StateStore + EventSink {}

impl<T> Ledger for T where T: StateStore + EventSink + ?Sized {}

impl<S> StateStore for Arc<S>
where
    S: StateStore + ?Sized,
{
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        (**self).get_state(key)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        (**self).put_state(key, value)
    }

    fn del_state(&self, key: &str) -> Result<(), LedgerError> {
        (**self).del_state(key)
    }

    fn state_by_range(&self, start: &str, end: &str) -> Result<StateIter<'_>, LedgerError> {
        (**self).state_by_range(start, end)
    }

    fn state_by_partial_composite_key(
        &self,
        namespace: &str,
        parts: &[&str],
    ) -> Result<StateIter<'_>, LedgerError> {
        (**self).state_by_partial_composite_key(namespace, parts)
    }

    fn create_composite_key(&self, namespace: &str, parts: &[&str]) -> Result<String, LedgerError> {
        (**self).create_composite_key(namespace, parts)
    }
}

impl<S> EventSink for Arc<S>
where
    S: EventSink + ?Sized,
{
    fn set_event(&self, name: &str, payload: &[u8]) -> Result<(), LedgerError> {
        (**self).set_event(name, payload)
    }
}
