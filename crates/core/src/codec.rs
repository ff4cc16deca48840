//! Entity codec: documents to/from opaque ledger payloads.
//!
//! Every record and event payload written to the ledger is produced here.
//! The encoding is JSON so payloads stay self-describing; optional attributes
//! are omitted rather than written as `null`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure to turn a payload back into a document.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload was present but held zero bytes.
    #[error("payload is empty")]
    Empty,

    /// The payload did not parse as the expected document.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A serde-backed document that can live in ledger state.
///
/// `encode` is best-effort: a serialization failure is logged and degrades to
/// an empty payload instead of surfacing. Callers that persist the result rely
/// on `decode` rejecting empty payloads.
pub trait Document: Serialize + DeserializeOwned {
    fn encode(&self) -> Vec<u8> {
        match serde_json::to_vec(self) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(error = %err, "failed to encode document");
                Vec::new()
            }
        }
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::Empty);
        }

        Ok(serde_json::from_slice(bytes)?)
    }
}
