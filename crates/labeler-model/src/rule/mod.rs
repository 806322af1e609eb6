mod content;
pub use content::RuleContent;

mod key_range;
pub use key_range::{KeyRangeRule, KeyRangeRuleConfig};

mod label_rule;
pub use label_rule::{LabelRule, LabelRuleInput};

mod patch;
pub use patch::LabelRulePatch;

mod registry;
pub use registry::{IntoRuleContent, RuleRegistry, RuleRegistryBuilder};
