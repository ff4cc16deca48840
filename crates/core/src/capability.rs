//! Capabilities repositories call into but do not define.

use crate::error::DomainResult;

/// Structural validation owned by an entity type.
///
/// Repositories only react to the outcome; the rules live with the entity.
pub trait Validate {
    fn validate(&self) -> DomainResult<()>;
}

/// Partial-update payload that mutates an existing entity in place.
///
/// Implementations must never assign or clear the target's identifier.
pub trait Merge<T> {
    fn merge_into(&self, target: &mut T);
}
