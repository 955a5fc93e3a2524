//! Value object trait: equality by value, not identity.

/// Marker trait for immutable values compared by their attributes.
///
/// An identity provider assertion is the typical example: two assertions
/// carrying the same claims are interchangeable, and neither is ever edited
/// after it has been parsed.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
