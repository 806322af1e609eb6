use std::sync::Arc;

/// Kind of rule mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Set,
    Delete,
    Patch,
}

impl MutationOp {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            MutationOp::Set => "set",
            MutationOp::Delete => "delete",
            MutationOp::Patch => "patch",
        }
    }
}

/// How a rule mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Persisted and applied.
    Ok,
    /// Rejected by validation; nothing was written.
    Invalid,
    /// Storage refused the write; in-memory state untouched.
    StorageError,
}

impl MutationOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            MutationOutcome::Ok => "ok",
            MutationOutcome::Invalid => "invalid",
            MutationOutcome::StorageError => "storage_error",
        }
    }
}

/// Labeler metrics collection interface.
pub trait LabelerMetrics: Send + Sync + 'static {
    /// Record the result of a set / delete / patch call.
    fn record_mutation(&self, op: MutationOp, outcome: MutationOutcome);
    /// Record how many rules matched a region label query.
    fn record_query(&self, matched_rules: usize);
    /// Publish the current number of rules.
    fn set_rule_count(&self, rules: usize);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn LabelerMetrics>;
