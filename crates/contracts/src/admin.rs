//! Administrative capability for destructive bulk operations.

/// Proof that the caller may run bulk removals.
///
/// Only [`crate::ContractConfig::admin_capability`] hands one out, and only when
/// administrative operations were enabled in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCapability {
    _private: (),
}

impl AdminCapability {
    pub(crate) fn grant() -> Self {
        Self { _private: () }
    }
}
