//! Scoped range iteration over ledger state.
//!
//! Range and prefix queries hand out a cursor that holds ledger resources
//! until it is closed. [`StateIter`] owns that cursor and closes it on every
//! exit path: exhaustion, early `break`, `?` propagation, or unwinding.

use crate::error::LedgerError;

/// A single state entry returned by a range query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// Raw cursor produced by a ledger implementation.
///
/// Lazy, finite and not restartable. Callers never use this directly; it is
/// always wrapped in a [`StateIter`].
pub trait StateQueryIterator: Send {
    fn has_next(&self) -> bool;

    fn next_entry(&mut self) -> Result<KeyValue, LedgerError>;

    /// Releases the cursor. Called exactly once by [`StateIter`].
    fn close(&mut self) -> Result<(), LedgerError>;
}

/// Owning guard around a ledger cursor.
pub struct StateIter<'a> {
    cursor: Box<dyn StateQueryIterator + 'a>,
    closed: bool,
}

impl<'a> StateIter<'a> {
    pub fn new(cursor: impl StateQueryIterator + 'a) -> Self {
        Self {
            cursor: Box::new(cursor),
            closed: false,
        }
    }

    /// Closes the cursor now and reports the outcome.
    pub fn close(mut self) -> Result<(), LedgerError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), LedgerError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.cursor.close()
    }
}

impl Iterator for StateIter<'_> {
    type Item = Result<KeyValue, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed || !self.cursor.has_next() {
            return None;
        }
        Some(self.cursor.next_entry())
    }
}

impl Drop for StateIter<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            tracing::warn!(error = %err, "failed to close state iterator");
        }
    }
}

impl core::fmt::Debug for StateIter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateIter")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
