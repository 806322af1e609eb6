use serde_json::Value;

use crate::{RULE_TYPE_KEY_RANGE, rule::KeyRangeRule};

/// Typed payload of a label rule, one variant per registered rule type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuleContent {
    /// Matches regions whose key range lies inside `[start_key, end_key)`.
    KeyRange(KeyRangeRule),
}

impl RuleContent {
    /// Returns the rule type tag this payload is stored under.
    pub fn rule_type(&self) -> &'static str {
        match self {
            RuleContent::KeyRange(_) => RULE_TYPE_KEY_RANGE,
        }
    }

    /// Returns the key range, if this payload constrains one.
    pub fn key_range(&self) -> Option<&KeyRangeRule> {
        match self {
            RuleContent::KeyRange(r) => Some(r),
        }
    }

    /// Encode the payload into its wire form.
    pub fn to_value(&self) -> Value {
        match self {
            RuleContent::KeyRange(r) => {
                let cfg = r.to_config();
                serde_json::json!({
                    "start_key": cfg.start_key,
                    "end_key": cfg.end_key,
                })
            }
        }
    }
}

impl From<KeyRangeRule> for RuleContent {
    fn from(r: KeyRangeRule) -> Self {
        RuleContent::KeyRange(r)
    }
}
