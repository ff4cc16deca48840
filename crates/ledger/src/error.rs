use thiserror::Error;

/// Ledger operation error.
///
/// These are **infrastructure errors** (storage, concurrency, key encoding) as
/// opposed to domain errors (validation). Contracts propagate them unchanged;
/// nothing in this workspace retries a failed ledger call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A namespace or key component cannot be encoded into a composite key.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The write was rejected because a concurrent transaction touched the key.
    #[error("write conflict: {0}")]
    Conflict(String),

    /// The state database could not serve the request.
    #[error("state unavailable: {0}")]
    Unavailable(String),

    /// A range cursor failed while being advanced or closed.
    #[error("iterator failure: {0}")]
    Iterator(String),

    /// The event could not be attached to the transaction.
    #[error("event rejected: {0}")]
    Event(String),
}

impl LedgerError {
    pub(crate) fn poisoned() -> Self {
        Self::Unavailable("lock poisoned".to_string())
    }
}
