//! Device and requirements contracts.
//!
//! Repositories in this crate are the only code path that mutates entity state
//! on the ledger. Each operation runs as one synchronous transaction against an
//! injected [`chainmetric_ledger::Ledger`]:
//!
//! ```text
//! decode input → mint key (create) / retrieve + merge (update) → validate
//!   → commit state → notify (best-effort) → result
//! ```

pub mod admin;
pub mod config;
pub mod device;
pub mod error;
pub mod keys;
pub mod notify;
pub mod requirements;
pub mod router;

mod repository;

#[cfg(test)]
mod test_support;

pub use admin::AdminCapability;
pub use config::{ContractConfig, init_from_env};
pub use device::DeviceRepository;
pub use error::{ContractError, ContractResult};
pub use keys::{KeyScheme, SuffixGenerator, TimeOrderedSuffix};
pub use notify::NotifyReport;
pub use requirements::RequirementsRepository;
pub use router::Contract;
