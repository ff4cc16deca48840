//! Entity trait: identity + continuity across state changes.

use crate::codec::Document;

/// A record persisted under its own ledger key.
///
/// The id is empty until the owning repository mints one at creation and is
/// never reassigned afterwards.
pub trait Entity: Document {
    /// Namespace tag used as the first composite-key component.
    const NAMESPACE: &'static str;

    /// Human-readable kind used in error messages ("device", "requirement").
    const KIND: &'static str;

    /// Returns the entity identifier (empty when not yet persisted).
    fn id(&self) -> &str;

    /// Assigns the identifier. Repositories call this exactly once, at creation.
    fn assign_id(&mut self, id: String);

    fn has_id(&self) -> bool {
        !self.id().is_empty()
    }
}
