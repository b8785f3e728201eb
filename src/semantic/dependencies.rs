//! Measure dependency extraction.
//!
//! [`measure_dependencies`] is the non-recursive view: the measures a metric
//! names directly. [`measure_closure`] follows derived metrics down to their
//! measures and reports cycles and unknown parents along the way.

use std::collections::{BTreeSet, HashSet};

use crate::model::{Metric, MetricKind};

use super::CatalogIndex;

/// Measures referenced directly by `metric`.
///
/// Derived metrics depend on metrics, not measures, so they yield nothing
/// here. Conversion metrics are outside the analysis and also yield nothing.
pub fn measure_dependencies(metric: &Metric) -> BTreeSet<&str> {
    match &metric.kind {
        MetricKind::Simple { measure } => BTreeSet::from([measure.as_str()]),
        MetricKind::Ratio {
            numerator,
            denominator,
        } => BTreeSet::from([numerator.as_str(), denominator.as_str()]),
        MetricKind::Derived { .. } | MetricKind::Conversion { .. } => BTreeSet::new(),
    }
}

/// Why a metric's measure closure could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DependencyError {
    /// A derived metric reaches itself again. `path` starts and ends with
    /// the repeated metric.
    #[error("cyclic metric dependency: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("metric '{referenced_by}' references unknown metric '{name}'")]
    UnknownMetric { name: String, referenced_by: String },
}

/// Every measure `metric` depends on, following derived parents recursively.
///
/// The currently-visited chain is copied into each branch, so two parents
/// sharing an ancestor are not mistaken for a cycle. A metric whose subtree
/// has already been collected is skipped: its measures are in the set.
pub fn measure_closure<'a>(
    metric: &'a Metric,
    index: &CatalogIndex<'a>,
) -> Result<BTreeSet<&'a str>, DependencyError> {
    let mut measures = BTreeSet::new();
    let mut finished = HashSet::new();
    collect(metric, index, &[], &mut measures, &mut finished)?;
    Ok(measures)
}

fn collect<'a>(
    metric: &'a Metric,
    index: &CatalogIndex<'a>,
    path: &[&'a str],
    measures: &mut BTreeSet<&'a str>,
    finished: &mut HashSet<&'a str>,
) -> Result<(), DependencyError> {
    if finished.contains(metric.name.as_str()) {
        return Ok(());
    }

    if path.contains(&metric.name.as_str()) {
        let start = path.iter().position(|n| *n == metric.name).unwrap_or(0);
        let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
        cycle.push(metric.name.clone());
        return Err(DependencyError::Cycle { path: cycle });
    }

    if !metric.is_derived() {
        measures.extend(measure_dependencies(metric));
        finished.insert(metric.name.as_str());
        return Ok(());
    }

    let mut branch = path.to_vec();
    branch.push(metric.name.as_str());

    for parent in metric.parent_metrics() {
        let parent_metric =
            index
                .metric(&parent.name)
                .ok_or_else(|| DependencyError::UnknownMetric {
                    name: parent.name.clone(),
                    referenced_by: metric.name.clone(),
                })?;
        collect(parent_metric, index, &branch, measures, finished)?;
    }

    finished.insert(metric.name.as_str());
    Ok(())
}
