//! Prometheus metrics backend for the region labeler.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use labeler_core::{MemoryKv, RegionLabeler};
//! use labeler_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let labeler = RegionLabeler::builder(Arc::new(MemoryKv::new()))
//!     .metrics(Arc::new(metrics.clone()))
//!     .build()?;
//! assert!(labeler.is_empty());
//!
//! // let families = metrics.gather();
//! // prometheus::TextEncoder::new().encode(&families, &mut response_buffer)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `labeler_rule_mutations_total{op, outcome}` - Counter
//! - `labeler_query_matched_rules` - Histogram
//! - `labeler_rules` - Gauge
//!
//! This crate does NOT serve `/metrics`; expose [`PrometheusMetrics::gather`] through
//! whatever HTTP framework the host process already runs.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
