//! Entity models managed by the contracts.
//!
//! Plain data + the structural rules each entity owns (no ledger access, no
//! key minting). Wire names follow the JSON documents clients already submit.

pub mod device;
pub mod metric;
pub mod requirements;

pub use device::{Device, DeviceState, DeviceUpdateRequest};
pub use metric::Metric;
pub use requirements::{Requirement, Requirements, RequirementsMap};
