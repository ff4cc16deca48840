//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity of their own: two with the same attributes
/// are interchangeable. A metric threshold pair is one; a device is not.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
