use serde::{Deserialize, Serialize};

use crate::rule::LabelRuleInput;

/// Batch of rule mutations applied as one unit.
///
/// Deletions are applied before upserts, so an id present in both lists ends up set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelRulePatch {
    #[serde(rename = "sets", default)]
    pub set_rules: Vec<LabelRuleInput>,
    #[serde(rename = "deletes", default)]
    pub delete_rules: Vec<String>,
}

impl LabelRulePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an upsert. Returns `self` for chaining.
    pub fn set(mut self, rule: LabelRuleInput) -> Self {
        self.set_rules.push(rule);
        self
    }

    /// Queue a deletion. Returns `self` for chaining.
    pub fn delete(mut self, id: impl Into<String>) -> Self {
        self.delete_rules.push(id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set_rules.is_empty() && self.delete_rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegionLabel;

    #[test]
    fn wire_names() {
        let patch = LabelRulePatch::new()
            .set(LabelRuleInput::key_range(
                "r2",
                vec![RegionLabel::new("k2", "v2")],
                "ab12",
                "cd12",
            ))
            .delete("r1");

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["deletes"], serde_json::json!(["r1"]));
        assert_eq!(json["sets"][0]["id"], "r2");

        let back: LabelRulePatch = serde_json::from_value(json).unwrap();
        assert_eq!(back, patch);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let patch: LabelRulePatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }
}
