//! Metric definitions.
//!
//! Metrics are the unit the analysis core reasons about. Each metric is one
//! of four closed variants; every consumer matches on [`MetricKind`]
//! exhaustively, so adding a variant is a compile-time change everywhere.

use serde::{Deserialize, Serialize};

/// A metric defined over the catalog's measures (or over other metrics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(flatten)]
    pub kind: MetricKind,
    /// Explicit join anchor declared in the metric's metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Variant-specific metric parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricKind {
    /// Exposes a single measure.
    Simple { measure: String },
    /// Divides one measure by another.
    Ratio {
        numerator: String,
        denominator: String,
    },
    /// Combines other metrics through an expression over their aliases.
    Derived {
        expr: String,
        metrics: Vec<MetricInput>,
    },
    /// Funnel conversion between two measures over an entity.
    Conversion {
        entity: String,
        base_measure: String,
        conversion_measure: String,
    },
}

/// A parent metric referenced by a derived metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl MetricInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// Name the parent is bound to inside the derived expression.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl Metric {
    fn with_kind(name: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            kind,
            primary_entity: None,
            label: None,
            description: None,
        }
    }

    pub fn simple(name: impl Into<String>, measure: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            MetricKind::Simple {
                measure: measure.into(),
            },
        )
    }

    pub fn ratio(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            MetricKind::Ratio {
                numerator: numerator.into(),
                denominator: denominator.into(),
            },
        )
    }

    /// A derived metric over `parents`, each bound under its own name.
    pub fn derived<I, S>(name: impl Into<String>, expr: impl Into<String>, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(
            name,
            MetricKind::Derived {
                expr: expr.into(),
                metrics: parents.into_iter().map(MetricInput::new).collect(),
            },
        )
    }

    pub fn conversion(
        name: impl Into<String>,
        entity: impl Into<String>,
        base_measure: impl Into<String>,
        conversion_measure: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            MetricKind::Conversion {
                entity: entity.into(),
                base_measure: base_measure.into(),
                conversion_measure: conversion_measure.into(),
            },
        )
    }

    pub fn with_primary_entity(mut self, entity: impl Into<String>) -> Self {
        self.primary_entity = Some(entity.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Variant tag as it appears in catalog files.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            MetricKind::Simple { .. } => "simple",
            MetricKind::Ratio { .. } => "ratio",
            MetricKind::Derived { .. } => "derived",
            MetricKind::Conversion { .. } => "conversion",
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.kind, MetricKind::Derived { .. })
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self.kind, MetricKind::Conversion { .. })
    }

    /// Parent metrics of a derived metric; empty for every other variant.
    pub fn parent_metrics(&self) -> &[MetricInput] {
        match &self.kind {
            MetricKind::Derived { metrics, .. } => metrics,
            _ => &[],
        }
    }
}
