//! Entity connectivity validation.
//!
//! For each metric this checks, in order:
//!
//! 1. An anchor entity is declared, or (for ratio metrics) can be inferred
//!    from the denominator's model
//! 2. A declared anchor is some model's primary entity
//! 3. The metric's measure closure is well-formed: no cycles, no unknown
//!    parent metrics, no unknown measures
//! 4. Every measure's model is reachable from the anchor within the hop
//!    budget, and not further than the recommended hop count
//!
//! The first failing step records its issue and ends that metric's checks.
//! Join graphs are cached per anchor entity for the validator's lifetime.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::model::{Metric, MetricKind};
use crate::semantic::{measure_closure, CatalogIndex, DependencyError, JoinGraph, DEFAULT_MAX_HOPS};

use super::{suggest_closest, IssueContext, IssueDraft, IssueKind, ValidationResult};

/// Hop limits applied during validation.
///
/// A measure is only checked against `recommended_hops` once it is known to
/// be reachable, i.e. within `max_hops`. With `recommended_hops >= max_hops`,
/// which includes the defaults, [`IssueKind::ExceedsHopLimit`] is never
/// reported. Lower `recommended_hops` to get distance warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityOptions {
    /// Join budget for reachability; measures beyond it are unreachable.
    pub max_hops: usize,
    /// Reachable measures further than this produce a warning. Has no effect
    /// unless it is below `max_hops`.
    pub recommended_hops: usize,
}

impl Default for ConnectivityOptions {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            recommended_hops: DEFAULT_MAX_HOPS,
        }
    }
}

/// Checks that metrics can reach all their measures from their anchor entity.
#[derive(Debug)]
pub struct EntityConnectivityValidator<'i, 'a> {
    index: &'i CatalogIndex<'a>,
    options: ConnectivityOptions,
    /// Anchor entity -> join graph. Safe to share: graphs are deterministic
    /// for a fixed catalog, so a racing rebuild stores an identical value.
    graphs: DashMap<String, Arc<JoinGraph>>,
}

impl<'i, 'a> EntityConnectivityValidator<'i, 'a> {
    pub fn new(index: &'i CatalogIndex<'a>) -> Self {
        Self::with_options(index, ConnectivityOptions::default())
    }

    pub fn with_options(index: &'i CatalogIndex<'a>, options: ConnectivityOptions) -> Self {
        Self {
            index,
            options,
            graphs: DashMap::new(),
        }
    }

    pub fn options(&self) -> ConnectivityOptions {
        self.options
    }

    /// The join graph for `anchor`, built on first use.
    pub fn join_graph(&self, anchor: &str) -> Arc<JoinGraph> {
        if let Some(graph) = self.graphs.get(anchor) {
            return Arc::clone(graph.value());
        }

        let graph = Arc::new(JoinGraph::build(anchor, self.index, self.options.max_hops));
        self.graphs.insert(anchor.to_string(), Arc::clone(&graph));
        graph
    }

    /// Number of distinct anchors with a cached join graph.
    pub fn cached_graph_count(&self) -> usize {
        self.graphs.len()
    }

    /// Validate every metric in the catalog, in catalog order.
    pub fn validate_all(&self) -> ValidationResult {
        self.validate_metrics(&self.index.catalog().metrics)
    }

    /// Validate `metrics` in order; each metric is checked independently.
    pub fn validate_metrics<'m>(
        &self,
        metrics: impl IntoIterator<Item = &'m Metric>,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut count = 0usize;
        for metric in metrics {
            result.extend(self.validate_metric(metric));
            count += 1;
        }

        info!(
            metrics = count,
            errors = result.error_count(),
            warnings = result.warning_count(),
            "validated metrics"
        );
        result
    }

    /// Validate `metrics` on up to `workers` threads.
    ///
    /// The batch is split into contiguous chunks, one per worker, and the
    /// partial results are merged back in input order, so the output is
    /// identical to [`validate_metrics`](Self::validate_metrics).
    pub fn validate_metrics_parallel(&self, metrics: &[&Metric], workers: usize) -> ValidationResult {
        let workers = workers.max(1);
        if workers == 1 || metrics.len() < 2 {
            return self.validate_metrics(metrics.iter().copied());
        }

        let chunk_size = metrics.len().div_ceil(workers);
        debug!(metrics = metrics.len(), workers, chunk_size, "dispatching validation");

        let partials: Vec<ValidationResult> = thread::scope(|scope| {
            let handles: Vec<_> = metrics
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        let mut partial = ValidationResult::new();
                        for metric in chunk {
                            partial.extend(self.validate_metric(metric));
                        }
                        partial
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });

        let mut result = ValidationResult::new();
        for partial in partials {
            result.extend(partial);
        }

        info!(
            metrics = metrics.len(),
            errors = result.error_count(),
            warnings = result.warning_count(),
            "validated metrics"
        );
        result
    }

    /// Validate a single metric.
    pub fn validate_metric(&self, metric: &Metric) -> ValidationResult {
        let mut result = ValidationResult::new();

        if metric.is_conversion() {
            debug!(metric = %metric.name, "skipping conversion metric");
            return result;
        }

        let Some(anchor) = self.resolve_anchor(metric, &mut result) else {
            return result;
        };

        let measures = match measure_closure(metric, self.index) {
            Ok(measures) => measures,
            Err(err) => {
                self.record_dependency_error(metric, &anchor, err, &mut result);
                return result;
            }
        };

        if !self.check_measures_exist(metric, &anchor, &measures, &mut result) {
            return result;
        }

        let graph = self.join_graph(&anchor);
        for measure in &measures {
            self.check_reachability(metric, &graph, measure, &mut result);
        }

        debug!(
            metric = %metric.name,
            anchor = %anchor,
            issues = result.len(),
            "validated metric"
        );
        result
    }

    /// Step 1 and 2: find the anchor entity, or record why there is none.
    fn resolve_anchor(&self, metric: &Metric, result: &mut ValidationResult) -> Option<String> {
        if let Some(declared) = &metric.primary_entity {
            if self.index.is_primary_entity(declared) {
                return Some(declared.clone());
            }
            result.add_error(self.invalid_primary_entity(metric, declared));
            return None;
        }

        if let MetricKind::Ratio { denominator, .. } = &metric.kind {
            if let Some(entity) = self
                .index
                .measure_model(denominator)
                .and_then(|model| model.primary_entity())
            {
                debug!(
                    metric = %metric.name,
                    anchor = %entity.name,
                    "inferred anchor from denominator"
                );
                return Some(entity.name.clone());
            }
        }

        let mut draft = IssueDraft::new(
            IssueKind::MissingPrimaryEntity,
            &metric.name,
            format!(
                "Metric '{}' declares no primary_entity and none can be inferred",
                metric.name
            ),
        )
        .suggestion("Add a primary_entity to the metric's metadata");
        if let MetricKind::Ratio { denominator, .. } = &metric.kind {
            draft = draft.suggestion(format!(
                "Define denominator measure '{denominator}' on a semantic model with a primary entity"
            ));
        }
        result.add_error(draft.context(IssueContext {
            available_entities: self.available_entities(),
            ..IssueContext::default()
        }));
        None
    }

    fn invalid_primary_entity(&self, metric: &Metric, declared: &str) -> IssueDraft {
        let available = self.available_entities();
        let mut draft = IssueDraft::new(
            IssueKind::InvalidPrimaryEntity,
            &metric.name,
            format!(
                "Primary entity '{declared}' of metric '{}' is not the primary entity of any semantic model",
                metric.name
            ),
        );

        if let Some(model) = self
            .index
            .catalog()
            .semantic_models
            .iter()
            .find(|m| m.foreign_entities().any(|e| e.name == declared))
        {
            draft = draft.suggestion(format!(
                "'{declared}' is only a foreign entity (on model '{}'); anchor on a primary entity instead",
                model.name
            ));
        }
        if let Some(closest) = suggest_closest(declared, &available) {
            draft = draft.suggestion(format!("Did you mean '{closest}'?"));
        }

        draft
            .suggestion("Set primary_entity to one of the available entities")
            .context(IssueContext {
                primary_entity: Some(declared.to_string()),
                available_entities: available,
                ..IssueContext::default()
            })
    }

    fn record_dependency_error(
        &self,
        metric: &Metric,
        anchor: &str,
        err: DependencyError,
        result: &mut ValidationResult,
    ) {
        let context = IssueContext {
            primary_entity: Some(anchor.to_string()),
            ..IssueContext::default()
        };

        match err {
            DependencyError::Cycle { path } => {
                result.add_error(
                    IssueDraft::new(
                        IssueKind::CyclicDependency,
                        &metric.name,
                        format!(
                            "Metric '{}' has a cyclic dependency: {}",
                            metric.name,
                            path.join(" -> ")
                        ),
                    )
                    .suggestion("Remove one of the references so derived metrics no longer form a cycle")
                    .context(context),
                );
            }
            DependencyError::UnknownMetric {
                name,
                referenced_by,
            } => {
                let mut draft = IssueDraft::new(
                    IssueKind::MissingMetric,
                    &metric.name,
                    format!("Metric '{referenced_by}' references unknown metric '{name}'"),
                );
                if let Some(closest) = suggest_closest(&name, &self.index.metric_names()) {
                    draft = draft.suggestion(format!("Did you mean '{closest}'?"));
                }
                result.add_error(
                    draft
                        .suggestion(format!(
                            "Define metric '{name}' or remove it from '{referenced_by}'"
                        ))
                        .context(context),
                );
            }
        }
    }

    /// Step 3: every measure must exist. Reports all missing names at once.
    fn check_measures_exist(
        &self,
        metric: &Metric,
        anchor: &str,
        measures: &BTreeSet<&str>,
        result: &mut ValidationResult,
    ) -> bool {
        let missing: Vec<&str> = measures
            .iter()
            .copied()
            .filter(|name| self.index.measure_model(name).is_none())
            .collect();
        if missing.is_empty() {
            return true;
        }

        let known = self.index.measure_names();
        let mut draft = IssueDraft::new(
            IssueKind::MissingMeasure,
            &metric.name,
            format!(
                "Metric '{}' depends on undefined measure(s): {}",
                metric.name,
                missing.join(", ")
            ),
        );
        for name in &missing {
            if let Some(closest) = suggest_closest(name, &known) {
                draft = draft.suggestion(format!("Did you mean '{closest}' instead of '{name}'?"));
            }
        }

        result.add_error(
            draft
                .suggestion("Define the missing measures on a semantic model")
                .context(IssueContext {
                    primary_entity: Some(anchor.to_string()),
                    missing_measures: missing.iter().map(|s| s.to_string()).collect(),
                    ..IssueContext::default()
                }),
        );
        false
    }

    /// Steps 4 and 5 for one measure.
    fn check_reachability(
        &self,
        metric: &Metric,
        graph: &JoinGraph,
        measure: &str,
        result: &mut ValidationResult,
    ) {
        let Some(owner) = self.index.measure_model(measure) else {
            return;
        };
        let anchor = graph.anchor_entity();
        let anchor_model = graph.anchor_model().unwrap_or(anchor);

        let context = IssueContext {
            primary_entity: Some(anchor.to_string()),
            measure_name: Some(measure.to_string()),
            model_name: Some(owner.name.clone()),
            ..IssueContext::default()
        };

        match graph.hop_count(&owner.name) {
            None => {
                let mut draft = IssueDraft::new(
                    IssueKind::UnreachableMeasure,
                    &metric.name,
                    format!(
                        "Measure '{measure}' (model '{}') is not reachable from primary entity '{anchor}' (model '{anchor_model}') within {} hop(s)",
                        owner.name,
                        graph.max_hops()
                    ),
                );
                draft = match owner.primary_entity() {
                    Some(entity) => draft.suggestion(format!(
                        "Change the metric's primary_entity to one that can reach model '{}', such as '{}'",
                        owner.name, entity.name
                    )),
                    None => draft.suggestion(format!(
                        "Change the metric's primary_entity to one that can reach model '{}'",
                        owner.name
                    )),
                };
                result.add_error(
                    draft
                        .suggestion(format!(
                            "Add a foreign entity to model '{anchor_model}' (or a model it joins to) that references model '{}'",
                            owner.name
                        ))
                        .suggestion(
                            "Split the metric into metrics anchored on their own models and combine them downstream",
                        )
                        .context(context),
                );
            }
            Some(hops) if hops > self.options.recommended_hops => {
                result.add_warning(
                    IssueDraft::new(
                        IssueKind::ExceedsHopLimit,
                        &metric.name,
                        format!(
                            "Measure '{measure}' (model '{}') is {hops} hop(s) from primary entity '{anchor}', beyond the recommended {}",
                            owner.name, self.options.recommended_hops
                        ),
                    )
                    .suggestion(format!(
                        "Add a more direct relationship from model '{anchor_model}' to model '{}'",
                        owner.name
                    ))
                    .suggestion(format!(
                        "Anchor the metric on an entity closer to model '{}'",
                        owner.name
                    ))
                    .context(IssueContext {
                        hop_count: Some(hops),
                        ..context
                    }),
                );
            }
            Some(_) => {}
        }
    }

    fn available_entities(&self) -> Vec<String> {
        self.index
            .primary_entity_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
