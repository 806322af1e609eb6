mod domain;
pub use domain::RULE_TYPE_KEY_RANGE;
pub use domain::{KeyRangeRegion, Region, RegionLabel};

mod error;
pub use error::{ModelError, ModelResult};

mod rule;
pub use rule::{
    IntoRuleContent, KeyRangeRule, KeyRangeRuleConfig, LabelRule, LabelRuleInput, LabelRulePatch,
    RuleContent, RuleRegistry, RuleRegistryBuilder,
};
