use serde::{Deserialize, Serialize};

/// Single `key=value` tag applied to every region matched by a rule.
///
/// Emptiness is checked when the owning rule is validated, not on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionLabel {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: String,
}

impl RegionLabel {
    /// Create a new label.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get the key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns `true` if both key and value are set.
    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }
}

impl From<(&str, &str)> for RegionLabel {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}

impl From<(String, String)> for RegionLabel {
    fn from((key, value): (String, String)) -> Self {
        Self { key, value }
    }
}
