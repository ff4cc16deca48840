//! Contract error taxonomy.

use thiserror::Error;

use chainmetric_core::{CodecError, DomainError};
use chainmetric_ledger::LedgerError;

pub type ContractResult<T> = Result<T, ContractError>;

/// Failure returned by a contract operation.
///
/// Every public operation yields either a usable result or exactly one of
/// these. `Notify` is only ever logged or reported; no operation returns it.
#[derive(Debug, Error)]
pub enum ContractError {
    /// No value is stored under the id.
    #[error("the {kind} with ID {id:?} does not exist")]
    NotFound { kind: &'static str, id: String },

    /// The caller-supplied payload does not decode.
    #[error("failed to deserialize request: {0}")]
    Deserialization(#[source] CodecError),

    /// The bytes stored under an id do not decode.
    #[error("failed to decode stored {kind} {id:?}: {source}")]
    Decode {
        kind: &'static str,
        id: String,
        source: CodecError,
    },

    /// The entity's own structural rules rejected it.
    #[error("{kind} is not valid: {source}")]
    Validation {
        kind: &'static str,
        source: DomainError,
    },

    /// Save was called on an entity that was never assigned an id.
    #[error("the unique id must be defined for {0}")]
    UnassignedId(&'static str),

    /// The underlying ledger call failed.
    #[error("ledger call failed: {0}")]
    Store(#[from] LedgerError),

    /// An event could not be emitted after the state was committed.
    #[error("failed to emit event {event}: {source}")]
    Notify { event: String, source: LedgerError },

    /// The response document could not be produced.
    #[error("failed to encode response: {0}")]
    Response(#[source] serde_json::Error),

    #[error("unknown contract function {0:?}")]
    UnknownFunction(String),

    #[error("invalid arguments for {function}: {reason}")]
    InvalidArguments { function: String, reason: String },

    /// Bulk removal was requested without an administrative capability.
    #[error("administrative operations are disabled")]
    AdminDisabled,
}

impl ContractError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(kind: &'static str, source: DomainError) -> Self {
        Self::Validation { kind, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
