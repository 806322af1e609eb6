use std::sync::Arc;

use prometheus::{
    CounterVec, Histogram, HistogramOpts, IntGauge, Opts, Registry, proto::MetricFamily,
};

use labeler_core::{LabelerMetrics, MutationOp, MutationOutcome};

const NAMESPACE: &str = "labeler";

/// Prometheus implementation of [`LabelerMetrics`].
///
/// Label cardinality is bounded:
/// - `op`: "set", "delete", "patch"
/// - `outcome`: "ok", "invalid", "storage_error"
#[derive(Clone)]
pub struct PrometheusMetrics {
    mutations: CounterVec,
    query_matches: Histogram,
    rules: IntGauge,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a backend registering its collectors in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let mutations = CounterVec::new(
            Opts::new("rule_mutations_total", "Label rule mutations by operation and outcome")
                .namespace(NAMESPACE),
            &["op", "outcome"],
        )?;
        registry.register(Box::new(mutations.clone()))?;

        let query_matches = Histogram::with_opts(
            HistogramOpts::new(
                "query_matched_rules",
                "Number of rules containing the queried region",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.0, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]),
        )?;
        registry.register(Box::new(query_matches.clone()))?;

        let rules = IntGauge::with_opts(
            Opts::new("rules", "Label rules currently loaded").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(rules.clone()))?;

        Ok(Self {
            mutations,
            query_matches,
            rules,
            registry,
        })
    }

    /// Create a backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl LabelerMetrics for PrometheusMetrics {
    fn record_mutation(&self, op: MutationOp, outcome: MutationOutcome) {
        self.mutations
            .with_label_values(&[op.as_label(), outcome.as_label()])
            .inc();
    }

    fn record_query(&self, matched_rules: usize) {
        self.query_matches.observe(matched_rules as f64);
    }

    fn set_rule_count(&self, rules: usize) {
        self.rules.set(i64::try_from(rules).unwrap_or(i64::MAX));
    }
}
