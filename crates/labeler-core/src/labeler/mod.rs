//! Region labeler: the authoritative rule table plus its containment index.
//!
//! Every mutation follows the same order: validate, persist, then update memory.
//! Table and index sit behind one lock, so readers never see them disagree, and
//! the storage write happens while that lock is held so the durable record and the
//! in-memory view change together.
use std::{collections::BTreeMap, sync::Arc};

use labeler_model::{
    KeyRangeRegion, LabelRule, LabelRuleInput, LabelRulePatch, ModelError, RegionLabel,
    RuleRegistry,
};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    config::LabelerConfig,
    error::{CoreError, CoreResult},
    index::RangeIndex,
    metrics::{MetricsHandle, MutationOp, MutationOutcome, noop_metrics},
    storage::{KvOp, KvStore},
};


#[derive(Default)]
struct LabelerState {
    rules: BTreeMap<String, Arc<LabelRule>>,
    index: RangeIndex<Arc<LabelRule>>,
}

impl LabelerState {
    fn upsert(&mut self, rule: Arc<LabelRule>) {
        let id = rule.id().to_string();
        match rule.key_range() {
            Some(range) => {
                self.index.insert(id.clone(), range, rule.clone());
            }
            None => {
                self.index.remove(&id);
            }
        }
        self.rules.insert(id, rule);
    }

    fn remove(&mut self, id: &str) -> bool {
        self.index.remove(id);
        self.rules.remove(id).is_some()
    }
}

/// Builder for [`RegionLabeler`].
pub struct LabelerBuilder {
    storage: Arc<dyn KvStore>,
    config: LabelerConfig,
    registry: Arc<RuleRegistry>,
    metrics: MetricsHandle,
}

impl LabelerBuilder {
    pub fn new(storage: Arc<dyn KvStore>) -> Self {
        Self {
            storage,
            config: LabelerConfig::default(),
            registry: Arc::new(RuleRegistry::default()),
            metrics: noop_metrics(),
        }
    }

    pub fn config(mut self, config: LabelerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the set of accepted rule types.
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Validate the config and rebuild the rule set from storage.
    pub fn build(self) -> CoreResult<RegionLabeler> {
        self.config.validate()?;
        let labeler = RegionLabeler {
            storage: self.storage,
            config: self.config,
            registry: self.registry,
            metrics: self.metrics,
            state: RwLock::new(LabelerState::default()),
        };
        labeler.load()?;
        Ok(labeler)
    }
}

/// Shared, thread-safe labeler answering "which labels apply to this region".
pub struct RegionLabeler {
    storage: Arc<dyn KvStore>,
    config: LabelerConfig,
    registry: Arc<RuleRegistry>,
    metrics: MetricsHandle,
    state: RwLock<LabelerState>,
}

impl RegionLabeler {
    /// Create a labeler with default settings and load every persisted rule.
    pub fn new(storage: Arc<dyn KvStore>) -> CoreResult<Self> {
        LabelerBuilder::new(storage).build()
    }

    pub fn builder(storage: Arc<dyn KvStore>) -> LabelerBuilder {
        LabelerBuilder::new(storage)
    }

    #[instrument(level = "debug", skip(self), fields(prefix = %self.config.key_prefix))]
    fn load(&self) -> CoreResult<()> {
        let items = self.storage.load_all(&self.config.scan_prefix())?;

        let mut state = LabelerState::default();
        for (key, value) in items {
            let rule = LabelRuleInput::from_json(&value)
                .and_then(|input| self.registry.adjust(input))
                .and_then(|rule| {
                    // Deletes only ever touch `rule_key(id)`.
                    if key == self.config.rule_key(rule.id()) {
                        Ok(rule)
                    } else {
                        Err(ModelError::InvalidRule(format!(
                            "rule {} is stored under a foreign key",
                            rule.id()
                        )))
                    }
                })
                .map_err(|source| {
                    warn!(key = %key, error = %source, "persisted label rule rejected");
                    CoreError::Corrupted {
                        key: key.clone(),
                        source,
                    }
                })?;
            state.upsert(Arc::new(rule));
        }

        let loaded = state.rules.len();
        *self.state.write() = state;
        self.metrics.set_rule_count(loaded);
        info!(rules = loaded, "label rules loaded");
        Ok(())
    }

    fn validate(&self, op: MutationOp, input: LabelRuleInput) -> CoreResult<LabelRule> {
        self.registry.adjust(input).map_err(|e| {
            warn!(op = op.as_label(), error = %e, "label rule rejected");
            self.metrics.record_mutation(op, MutationOutcome::Invalid);
            CoreError::from(e)
        })
    }

    fn persisted<T>(&self, op: MutationOp, res: CoreResult<T>) -> CoreResult<T> {
        if let Err(e) = &res {
            warn!(op = op.as_label(), error = %e, "failed to persist label rules");
            self.metrics
                .record_mutation(op, MutationOutcome::StorageError);
        }
        res
    }

    /// Validate, persist and install a rule, replacing any rule with the same id.
    #[instrument(level = "debug", skip(self, input), fields(id = %input.id))]
    pub fn set_label_rule(&self, input: LabelRuleInput) -> CoreResult<()> {
        let rule = self.validate(MutationOp::Set, input)?;
        let value = rule.to_json()?;
        let key = self.config.rule_key(rule.id());

        let mut state = self.state.write();
        self.persisted(
            MutationOp::Set,
            self.storage.put(&key, &value).map_err(CoreError::from),
        )?;
        state.upsert(Arc::new(rule));

        self.metrics.record_mutation(MutationOp::Set, MutationOutcome::Ok);
        self.metrics.set_rule_count(state.rules.len());
        debug!(rules = state.rules.len(), "label rule set");
        Ok(())
    }

    /// Remove a rule. Unknown ids are ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_label_rule(&self, id: &str) -> CoreResult<()> {
        let key = self.config.rule_key(id);

        let mut state = self.state.write();
        self.persisted(
            MutationOp::Delete,
            self.storage.delete(&key).map_err(CoreError::from),
        )?;
        let existed = state.remove(id);

        self.metrics
            .record_mutation(MutationOp::Delete, MutationOutcome::Ok);
        self.metrics.set_rule_count(state.rules.len());
        debug!(existed, rules = state.rules.len(), "label rule deleted");
        Ok(())
    }

    /// Apply deletions then upserts as one unit.
    ///
    /// Every rule in `set_rules` is validated before anything is written; one bad
    /// rule rejects the whole patch. The writes go to storage as a single batch.
    #[instrument(
        level = "debug",
        skip(self, patch),
        fields(sets = patch.set_rules.len(), deletes = patch.delete_rules.len())
    )]
    pub fn patch(&self, patch: LabelRulePatch) -> CoreResult<()> {
        let LabelRulePatch {
            set_rules,
            delete_rules,
        } = patch;

        let rules = set_rules
            .into_iter()
            .map(|input| self.validate(MutationOp::Patch, input))
            .collect::<CoreResult<Vec<_>>>()?;

        let mut ops = Vec::with_capacity(delete_rules.len() + rules.len());
        for id in &delete_rules {
            ops.push(KvOp::Delete {
                key: self.config.rule_key(id),
            });
        }
        for rule in &rules {
            ops.push(KvOp::Put {
                key: self.config.rule_key(rule.id()),
                value: rule.to_json()?,
            });
        }

        let mut state = self.state.write();
        self.persisted(
            MutationOp::Patch,
            self.storage.write_batch(&ops).map_err(CoreError::from),
        )?;
        for id in &delete_rules {
            state.remove(id);
        }
        for rule in rules {
            state.upsert(Arc::new(rule));
        }

        self.metrics
            .record_mutation(MutationOp::Patch, MutationOutcome::Ok);
        self.metrics.set_rule_count(state.rules.len());
        debug!(rules = state.rules.len(), "label rule patch applied");
        Ok(())
    }

    pub fn get_label_rule(&self, id: &str) -> Option<Arc<LabelRule>> {
        self.state.read().rules.get(id).cloned()
    }

    /// Snapshot of every rule, ordered by id.
    pub fn get_all_label_rules(&self) -> Vec<Arc<LabelRule>> {
        self.state.read().rules.values().cloned().collect()
    }

    /// Rules for exactly the given ids, in request order.
    ///
    /// Fails with [`CoreError::NotFound`] if any id is missing.
    pub fn get_label_rules<S: AsRef<str>>(&self, ids: &[S]) -> CoreResult<Vec<Arc<LabelRule>>> {
        let state = self.state.read();
        ids.iter()
            .map(|id| {
                let id = id.as_ref();
                state
                    .rules
                    .get(id)
                    .cloned()
                    .ok_or_else(|| CoreError::NotFound(id.to_string()))
            })
            .collect()
    }

    fn matching_rules<R: KeyRangeRegion>(&self, region: &R) -> Vec<Arc<LabelRule>> {
        let state = self.state.read();
        let matched: Vec<Arc<LabelRule>> = state
            .index
            .query(region.start_key(), region.end_key())
            .into_iter()
            .cloned()
            .collect();
        drop(state);

        trace!(
            start = %hex::encode(region.start_key()),
            end = %hex::encode(region.end_key()),
            matched = matched.len(),
            "region label query"
        );
        self.metrics.record_query(matched.len());
        matched
    }

    /// Labels of every rule whose range contains the region.
    ///
    /// Matching rules are visited in id order and their labels concatenated as-is.
    pub fn get_region_labels<R: KeyRangeRegion>(&self, region: &R) -> Vec<RegionLabel> {
        self.matching_rules(region)
            .iter()
            .flat_map(|rule| rule.labels().iter().cloned())
            .collect()
    }

    /// Value of `key` for the region, or an empty string if no matching rule defines it.
    ///
    /// When several matching rules define `key`, the rule with the smallest id wins.
    pub fn get_region_label<R: KeyRangeRegion>(&self, region: &R, key: &str) -> String {
        self.matching_rules(region)
            .iter()
            .find_map(|rule| rule.label(key))
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Rule boundary keys strictly inside `(start_key, end_key)`; empty `end_key` is +inf.
    pub fn get_split_keys(&self, start_key: &[u8], end_key: &[u8]) -> Vec<Vec<u8>> {
        self.state.read().index.split_keys(start_key, end_key)
    }

    pub fn len(&self) -> usize {
        self.state.read().rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().rules.is_empty()
    }

    pub fn config(&self) -> &LabelerConfig {
        &self.config
    }
}
