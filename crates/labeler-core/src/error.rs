use labeler_model::ModelError;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("label rule error: {0}")]
    Model(#[from] ModelError),

    #[error("label rule not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid labeler config: {0}")]
    Config(String),

    #[error("corrupted label rule at {key}: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: ModelError,
    },
}

impl CoreError {
    /// Returns `true` if the caller supplied a rule that failed semantic checks.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Model(e) if e.is_validation())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
