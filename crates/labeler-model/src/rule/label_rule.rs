use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    RegionLabel,
    error::{ModelError, ModelResult},
    rule::{KeyRangeRule, RuleContent, RuleRegistry},
};

/// Label rule as received from an operator or read back from storage.
///
/// The `rule` payload is kept as raw JSON until it is checked by a [`RuleRegistry`].
/// Missing fields decode as empty values and are rejected during validation;
/// fields of the wrong JSON type fail at decode time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRuleInput {
    pub id: String,
    pub labels: Vec<RegionLabel>,
    pub rule_type: String,
    pub rule: Value,
}

impl LabelRuleInput {
    pub fn new(
        id: impl Into<String>,
        labels: Vec<RegionLabel>,
        rule_type: impl Into<String>,
        rule: Value,
    ) -> Self {
        Self {
            id: id.into(),
            labels,
            rule_type: rule_type.into(),
            rule,
        }
    }

    /// Shorthand for a `key-range` rule with hex-encoded bounds.
    pub fn key_range(
        id: impl Into<String>,
        labels: Vec<RegionLabel>,
        start_key_hex: &str,
        end_key_hex: &str,
    ) -> Self {
        Self::new(
            id,
            labels,
            crate::RULE_TYPE_KEY_RANGE,
            serde_json::json!({ "start_key": start_key_hex, "end_key": end_key_hex }),
        )
    }

    /// Decode the structural JSON form. No semantic checks are made here.
    pub fn from_json(bytes: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Validated label rule: a named set of labels bound to a typed matcher payload.
///
/// Serializes to the same JSON shape as [`LabelRuleInput`]. Deserializing and
/// [`TryFrom<LabelRuleInput>`] always validate against [`RuleRegistry::global`]; callers
/// holding a custom registry should decode a [`LabelRuleInput`] and call
/// [`RuleRegistry::adjust`] on it instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "LabelRuleInput", try_from = "LabelRuleInput")]
pub struct LabelRule {
    id: String,
    labels: Vec<RegionLabel>,
    content: RuleContent,
}

impl LabelRule {
    /// Build a rule from an already typed payload.
    pub fn new(
        id: impl Into<String>,
        labels: Vec<RegionLabel>,
        content: impl Into<RuleContent>,
    ) -> ModelResult<Self> {
        let id = id.into();
        check_header(&id, &labels)?;
        Ok(Self {
            id,
            labels,
            content: content.into(),
        })
    }

    /// Header must already be checked by the caller.
    pub(crate) fn from_checked(id: String, labels: Vec<RegionLabel>, content: RuleContent) -> Self {
        Self {
            id,
            labels,
            content,
        }
    }

    /// Decode and validate a persisted rule.
    pub fn from_json(bytes: &[u8]) -> ModelResult<Self> {
        RuleRegistry::global().adjust(LabelRuleInput::from_json(bytes)?)
    }

    /// Encode into the persisted JSON form.
    pub fn to_json(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(&LabelRuleInput::from(self.clone()))?)
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn labels(&self) -> &[RegionLabel] {
        &self.labels
    }

    #[inline]
    pub fn content(&self) -> &RuleContent {
        &self.content
    }

    pub fn rule_type(&self) -> &'static str {
        self.content.rule_type()
    }

    pub fn key_range(&self) -> Option<&KeyRangeRule> {
        self.content.key_range()
    }

    /// Value of the first label with the given key.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.key() == key)
            .map(|l| l.value())
    }
}

impl From<LabelRule> for LabelRuleInput {
    fn from(rule: LabelRule) -> Self {
        let rule_type = rule.content.rule_type().to_string();
        let payload = rule.content.to_value();
        Self {
            id: rule.id,
            labels: rule.labels,
            rule_type,
            rule: payload,
        }
    }
}

/// Validates against [`RuleRegistry::global`].
impl TryFrom<LabelRuleInput> for LabelRule {
    type Error = ModelError;
    fn try_from(input: LabelRuleInput) -> ModelResult<Self> {
        RuleRegistry::global().adjust(input)
    }
}

pub(crate) fn check_header(id: &str, labels: &[RegionLabel]) -> ModelResult<()> {
    if id.is_empty() {
        return Err(ModelError::InvalidRule("rule id is empty".into()));
    }
    if labels.is_empty() {
        return Err(ModelError::InvalidRule(format!("rule {id} has no labels")));
    }
    if let Some(bad) = labels.iter().find(|l| !l.is_complete()) {
        return Err(ModelError::InvalidRule(format!(
            "rule {id} has a label with empty key or value: {:?}={:?}",
            bad.key(),
            bad.value()
        )));
    }
    Ok(())
}
