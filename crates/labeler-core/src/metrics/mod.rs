//! Metrics collection abstraction for the region labeler.
//!
//! Backends (prometheus, statsd, etc) implement [`LabelerMetrics`] and are handed to
//! [`crate::LabelerBuilder::metrics`].
mod backend;
pub use backend::{LabelerMetrics, MetricsHandle, MutationOp, MutationOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
