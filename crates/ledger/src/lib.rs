//! Ledger boundary consumed by the contracts.
//!
//! This crate defines the key-value + event capability surface the contracts
//! run against, the composite-key encoding shared by every namespace, and an
//! in-memory ledger for tests/dev. It makes no consensus or durability claims.

pub mod composite;
pub mod error;
pub mod iterator;
pub mod memory;
pub mod store;

pub use composite::create_composite_key;
pub use error::LedgerError;
pub use iterator::{KeyValue, StateIter, StateQueryIterator};
pub use memory::{EmittedEvent, Faults, InMemoryLedger};
pub use store::{EventSink, Ledger, StateStore};
