//! `chainmetric-core`: entity building blocks shared by every contract.
//!
//! This crate contains **pure domain** primitives (no ledger concerns): the
//! entity contract, the byte codec used for state and event payloads, and the
//! validation/merge capabilities repositories call into.

pub mod capability;
pub mod codec;
pub mod entity;
pub mod error;
pub mod value_object;

pub use capability::{Merge, Validate};
pub use codec::{CodecError, Document};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use value_object::ValueObject;
