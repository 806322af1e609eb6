//! Well-known rule type tags.

/// Tag of rules whose payload is a [`crate::KeyRangeRule`].
///
/// Stored verbatim in the `rule_type` field of the persisted JSON, so the value must never change.
pub const RULE_TYPE_KEY_RANGE: &str = "key-range";
