//! Rule type registry.
//!
//! Maps a `rule_type` tag to the decoder that turns the raw JSON payload of a
//! [`LabelRuleInput`] into a typed [`RuleContent`]. Decoders are registered
//! through [`IntoRuleContent`]: the concrete type is monomorphized at
//! registration time and erased behind a boxed closure, so dispatch at
//! validation time is a single map lookup.
//!
//! ```
//! use labeler_model::{KeyRangeRule, LabelRuleInput, RegionLabel, RuleRegistry};
//!
//! let registry = RuleRegistry::builder().rule::<KeyRangeRule>().build();
//! let input = LabelRuleInput::key_range("r1", vec![RegionLabel::new("k", "v")], "00", "ff");
//! let rule = registry.adjust(input).unwrap();
//! assert_eq!(rule.rule_type(), "key-range");
//! ```
use std::{collections::HashMap, fmt, sync::OnceLock};

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::{ModelError, ModelResult},
    rule::{KeyRangeRule, LabelRule, LabelRuleInput, RuleContent, label_rule::check_header},
};

/// Rule payload type that can be built from its wire configuration.
pub trait IntoRuleContent: Send + Sync + 'static {
    /// Tag stored in the `rule_type` field.
    const RULE_TYPE: &'static str;

    /// Wire shape of the payload.
    type Config: DeserializeOwned;

    /// Validate the decoded config and produce the typed payload.
    fn from_config(config: Self::Config) -> ModelResult<RuleContent>;
}

type BoxedRuleDecoder = Box<dyn Fn(&Value) -> ModelResult<RuleContent> + Send + Sync>;

/// Builder for an immutable [`RuleRegistry`].
#[derive(Default)]
pub struct RuleRegistryBuilder {
    decoders: HashMap<String, BoxedRuleDecoder>,
}

impl RuleRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register payload type `T` under [`IntoRuleContent::RULE_TYPE`].
    ///
    /// Registering the same tag twice keeps the last decoder.
    #[must_use]
    pub fn rule<T: IntoRuleContent>(mut self) -> Self {
        self.decoders.insert(
            T::RULE_TYPE.to_owned(),
            Box::new(|value: &Value| {
                let config = T::Config::deserialize(value).map_err(|e| {
                    ModelError::InvalidRuleContent {
                        rule_type: T::RULE_TYPE.to_owned(),
                        reason: e.to_string(),
                    }
                })?;
                T::from_config(config)
            }),
        );
        self
    }

    pub fn build(self) -> RuleRegistry {
        RuleRegistry {
            decoders: self.decoders,
        }
    }
}

/// Immutable set of known rule types and their decoders.
pub struct RuleRegistry {
    decoders: HashMap<String, BoxedRuleDecoder>,
}

impl RuleRegistry {
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::new()
    }

    /// Process-wide registry with every built-in rule type.
    pub fn global() -> &'static RuleRegistry {
        static GLOBAL: OnceLock<RuleRegistry> = OnceLock::new();
        GLOBAL.get_or_init(RuleRegistry::default)
    }

    pub fn contains(&self, rule_type: &str) -> bool {
        self.decoders.contains_key(rule_type)
    }

    /// Registered tags, sorted.
    pub fn rule_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Decode a raw payload for the given tag.
    pub fn decode(&self, rule_type: &str, value: &Value) -> ModelResult<RuleContent> {
        let decoder = self
            .decoders
            .get(rule_type)
            .ok_or_else(|| ModelError::UnknownRuleType(rule_type.to_string()))?;
        decoder(value)
    }

    /// Validate a loosely-typed rule and upgrade it to a [`LabelRule`].
    ///
    /// Pure: performs no I/O and touches no shared state.
    pub fn adjust(&self, input: LabelRuleInput) -> ModelResult<LabelRule> {
        check_header(&input.id, &input.labels)?;
        let content = self.decode(&input.rule_type, &input.rule)?;
        Ok(LabelRule::from_checked(input.id, input.labels, content))
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        RuleRegistry::builder().rule::<KeyRangeRule>().build()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rule_types", &self.rule_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegionLabel;

    fn parse(raw: &str) -> LabelRuleInput {
        LabelRuleInput::from_json(raw.as_bytes()).expect("structurally valid json")
    }

    #[test]
    fn adjust_decodes_hex_keys() {
        let input = LabelRuleInput::key_range(
            "foo",
            vec![RegionLabel::new("k1", "v1")],
            "12abcd",
            "34cdef",
        );
        let rule = RuleRegistry::global().adjust(input).unwrap();

        let range = rule.key_range().expect("key-range payload");
        assert_eq!(range.start_key(), &[0x12, 0xab, 0xcd]);
        assert_eq!(range.end_key(), &[0x34, 0xcd, 0xef]);
        assert_eq!(rule.id(), "foo");
        assert_eq!(rule.labels(), &[RegionLabel::new("k1", "v1")]);
    }

    #[test]
    fn adjust_accepts_unbounded_range() {
        let input = parse(
            r#"{"id":"id", "labels": [{"key": "k1", "value": "v1"}], "rule_type":"key-range", "rule": {"start_key":"", "end_key":""}}"#,
        );
        assert!(RuleRegistry::global().adjust(input).is_ok());
    }

    #[test]
    fn adjust_rejects_bad_rules() {
        let bad = [
            // no id
            r#"{"id":"", "labels": [{"key": "k1", "value": "v1"}], "rule_type":"key-range", "rule": {"start_key":"", "end_key":""}}"#,
            // no labels
            r#"{"id":"id", "labels": [], "rule_type":"key-range", "rule": {"start_key":"", "end_key":""}}"#,
            // empty label key
            r#"{"id":"id", "labels": [{"key": "", "value": "v1"}], "rule_type":"key-range", "rule": {"start_key":"", "end_key":""}}"#,
            // empty label value
            r#"{"id":"id", "labels": [{"key": "k1", "value": ""}], "rule_type":"key-range", "rule": {"start_key":"", "end_key":""}}"#,
            // unknown rule type
            r#"{"id":"id", "labels": [{"key": "k1", "value": "v1"}], "rule_type":"unknown", "rule": {"start_key":"", "end_key":""}}"#,
            // wrong rule content
            r#"{"id":"id", "labels": [{"key": "k1", "value": "v1"}], "rule_type":"key-range", "rule":123}"#,
            r#"{"id":"id", "labels": [{"key": "k1", "value": "v1"}], "rule_type":"key-range", "rule": {"start_key":123, "end_key":""}}"#,
            r#"{"id":"id", "labels": [{"key": "k1", "value": "v1"}], "rule_type":"key-range", "rule": {"start_key":"", "end_key":123}}"#,
            r#"{"id":"id", "labels": [{"key": "k1", "value": "v1"}], "rule_type":"key-range", "rule": {"start_key":"123", "end_key":"abcd"}}"#,
            r#"{"id":"id", "labels": [{"key": "k1", "value": "v1"}], "rule_type":"key-range", "rule": {"start_key":"abcd", "end_key":"123"}}"#,
            r#"{"id":"id", "labels": [{"key": "k1", "value": "v1"}], "rule_type":"key-range", "rule": {"start_key":"abcd", "end_key":"1234"}}"#,
        ];

        for (i, raw) in bad.iter().enumerate() {
            let res = RuleRegistry::global().adjust(parse(raw));
            match res {
                Err(e) => assert!(e.is_validation(), "#{i}: expected validation error, got {e:?}"),
                Ok(rule) => panic!("#{i}: expected error, got {rule:?}"),
            }
        }
    }

    #[test]
    fn unknown_type_reports_tag() {
        let input = parse(
            r#"{"id":"id", "labels": [{"key": "k1", "value": "v1"}], "rule_type":"txn-range", "rule": {}}"#,
        );
        match RuleRegistry::global().adjust(input) {
            Err(ModelError::UnknownRuleType(t)) => assert_eq!(t, "txn-range"),
            other => panic!("expected UnknownRuleType, got {other:?}"),
        }
    }

    #[test]
    fn empty_registry_knows_no_types() {
        let registry = RuleRegistry::builder().build();
        assert!(!registry.contains("key-range"));
        assert!(registry.rule_types().is_empty());

        let input = LabelRuleInput::key_range("r", vec![RegionLabel::new("k", "v")], "", "");
        assert!(matches!(
            registry.adjust(input),
            Err(ModelError::UnknownRuleType(_))
        ));
    }

    #[test]
    fn default_registry_lists_key_range() {
        assert_eq!(RuleRegistry::default().rule_types(), vec!["key-range"]);
        let dbg = format!("{:?}", RuleRegistry::global());
        assert!(dbg.contains("key-range"), "{dbg}");
    }
}
