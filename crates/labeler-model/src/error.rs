use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed label rule: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("invalid label rule: {0}")]
    InvalidRule(String),

    #[error("unknown rule type: {0}")]
    UnknownRuleType(String),

    #[error("invalid content for rule type {rule_type}: {reason}")]
    InvalidRuleContent { rule_type: String, reason: String },

    #[error("invalid key range: start key {start} must be less than end key {end}")]
    InvalidKeyRange { start: String, end: String },
}

impl ModelError {
    /// Returns `true` for semantic rule violations, `false` for structural decode failures.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ModelError::Deserialize(_))
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
