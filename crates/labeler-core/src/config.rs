use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Namespace under which rules are persisted unless configured otherwise.
pub const DEFAULT_KEY_PREFIX: &str = "region_label";

/// Labeler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelerConfig {
    /// Storage namespace; each rule lives at `{key_prefix}/{rule_id}`.
    pub key_prefix: String,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl LabelerConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.key_prefix.is_empty() {
            return Err(CoreError::Config("key_prefix is empty".into()));
        }
        if self.key_prefix.starts_with('/') || self.key_prefix.ends_with('/') {
            return Err(CoreError::Config(format!(
                "key_prefix {:?} must not start or end with '/'",
                self.key_prefix
            )));
        }
        Ok(())
    }

    /// Storage key of the rule with the given id.
    pub fn rule_key(&self, id: &str) -> String {
        format!("{}/{}", self.key_prefix, id)
    }

    /// Prefix that selects every persisted rule.
    pub fn scan_prefix(&self) -> String {
        format!("{}/", self.key_prefix)
    }
}
