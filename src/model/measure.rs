// src/model/measure.rs
use serde::{Deserialize, Serialize};

use crate::model::types::AggregationType;

/// A measure defined on a semantic model.
///
/// Only the name and owning model matter to the analysis core; the
/// aggregation and expression pass through to the emission layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub name: String,
    pub agg: AggregationType,
    /// Source expression; defaults to the measure name when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

impl Measure {
    pub fn new(name: impl Into<String>, agg: AggregationType) -> Self {
        Self {
            name: name.into(),
            agg,
            expr: None,
        }
    }

    pub fn sum(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::new(name, AggregationType::Sum).with_expr(expr)
    }

    pub fn count(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::new(name, AggregationType::Count).with_expr(expr)
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    /// The expression to aggregate.
    pub fn source_expr(&self) -> &str {
        self.expr.as_deref().unwrap_or(&self.name)
    }
}
