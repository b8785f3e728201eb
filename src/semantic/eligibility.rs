//! Same-model eligibility for metrics.
//!
//! A metric is *eligible* when every measure it ultimately depends on lives
//! on one semantic model. The emission layer uses this to decide whether it
//! may generate same-model features (comparison measures and the like) and
//! which entity to anchor them on.
//!
//! Resolution is total: every failure (missing measure, missing parent,
//! cross-model dependency, cycle, conversion metric) collapses to
//! [`Eligibility::Ineligible`]. Use the connectivity validator when the
//! reason matters.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::model::{Metric, MetricKind};

use super::dependencies::measure_dependencies;
use super::CatalogIndex;

/// Outcome of [`MetricEligibilityResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    /// All dependencies resolve to the model anchored on `anchor_entity`.
    Eligible { anchor_entity: String },
    Ineligible,
}

impl Eligibility {
    pub fn qualifies(&self) -> bool {
        matches!(self, Eligibility::Eligible { .. })
    }

    pub fn anchor_entity(&self) -> Option<&str> {
        match self {
            Eligibility::Eligible { anchor_entity } => Some(anchor_entity),
            Eligibility::Ineligible => None,
        }
    }

    /// `(qualifies, anchor_entity)` as consumed by the emission layer.
    pub fn into_parts(self) -> (bool, Option<String>) {
        match self {
            Eligibility::Eligible { anchor_entity } => (true, Some(anchor_entity)),
            Eligibility::Ineligible => (false, None),
        }
    }
}

/// Decides same-model eligibility for metrics in one catalog.
#[derive(Debug, Clone, Copy)]
pub struct MetricEligibilityResolver<'i, 'a> {
    index: &'i CatalogIndex<'a>,
}

impl<'i, 'a> MetricEligibilityResolver<'i, 'a> {
    pub fn new(index: &'i CatalogIndex<'a>) -> Self {
        Self { index }
    }

    /// Resolve `metric` against the catalog's metrics and measures.
    ///
    /// Finished metrics are memoized for the duration of the call, so shared
    /// ancestors in a derived web are resolved once.
    pub fn resolve(&self, metric: &Metric) -> Eligibility {
        self.resolve_visiting(metric, &HashSet::new(), &mut HashMap::new())
    }

    /// Resolve a catalog metric by name; unknown names are ineligible.
    pub fn resolve_by_name(&self, name: &str) -> Eligibility {
        match self.index.metric(name) {
            Some(metric) => self.resolve(metric),
            None => Eligibility::Ineligible,
        }
    }

    /// Convenience form returning `(qualifies, anchor_entity)`.
    pub fn is_eligible(&self, metric: &Metric) -> (bool, Option<String>) {
        self.resolve(metric).into_parts()
    }

    fn resolve_visiting(
        &self,
        metric: &Metric,
        visiting: &HashSet<String>,
        finished: &mut HashMap<String, Eligibility>,
    ) -> Eligibility {
        if visiting.contains(&metric.name) {
            return Eligibility::Ineligible;
        }
        if let Some(known) = finished.get(&metric.name) {
            return known.clone();
        }

        let outcome = self.resolve_kind(metric, visiting, finished);
        // An ineligible result caused by reaching an ancestor means this
        // metric sits on a cycle, so it holds from any path.
        finished.insert(metric.name.clone(), outcome.clone());
        outcome
    }

    fn resolve_kind(
        &self,
        metric: &Metric,
        visiting: &HashSet<String>,
        finished: &mut HashMap<String, Eligibility>,
    ) -> Eligibility {
        match &metric.kind {
            MetricKind::Simple { .. } | MetricKind::Ratio { .. } => {
                self.resolve_measures(&measure_dependencies(metric))
            }
            MetricKind::Conversion { .. } => Eligibility::Ineligible,
            MetricKind::Derived { metrics, .. } => {
                // Each branch gets its own copy so siblings never see each
                // other's ancestors.
                let mut branch = visiting.clone();
                branch.insert(metric.name.clone());

                let mut anchors = BTreeSet::new();
                for input in metrics {
                    let Some(parent) = self.index.metric(&input.name) else {
                        return Eligibility::Ineligible;
                    };
                    match self.resolve_visiting(parent, &branch, finished) {
                        Eligibility::Eligible { anchor_entity } => {
                            anchors.insert(anchor_entity);
                        }
                        Eligibility::Ineligible => return Eligibility::Ineligible,
                    }
                }

                let mut anchors = anchors.into_iter();
                match (anchors.next(), anchors.next()) {
                    (Some(anchor_entity), None) => Eligibility::Eligible { anchor_entity },
                    _ => Eligibility::Ineligible,
                }
            }
        }
    }

    /// Eligible iff every measure exists and all share one anchored model.
    fn resolve_measures(&self, measures: &BTreeSet<&str>) -> Eligibility {
        let mut owners = BTreeSet::new();
        for name in measures {
            let Some(model) = self.index.measure_model(name) else {
                return Eligibility::Ineligible;
            };
            owners.insert(model.name.as_str());
        }

        let mut owners = owners.into_iter();
        let (Some(owner), None) = (owners.next(), owners.next()) else {
            return Eligibility::Ineligible;
        };

        self.index
            .model(owner)
            .and_then(|model| model.primary_entity())
            .map_or(Eligibility::Ineligible, |entity| Eligibility::Eligible {
                anchor_entity: entity.name.clone(),
            })
    }
}
