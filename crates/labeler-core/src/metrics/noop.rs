use crate::metrics::backend::{LabelerMetrics, MutationOp, MutationOutcome};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl LabelerMetrics for NoOpMetrics {
    #[inline(always)]
    fn record_mutation(&self, _: MutationOp, _: MutationOutcome) {}

    #[inline(always)]
    fn record_query(&self, _: usize) {}

    #[inline(always)]
    fn set_rule_count(&self, _: usize) {}
}
