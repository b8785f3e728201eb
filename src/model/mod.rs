//! In-memory semantic catalog handed over by the ingestion layer.

pub mod error;
pub mod measure;
pub mod metric;
pub mod semantic_model;
pub mod types;

pub use error::{CatalogError, CatalogResult};
pub use measure::Measure;
pub use metric::{Metric, MetricInput, MetricKind};
pub use semantic_model::{Entity, SemanticModel};
pub use types::{AggregationType, EntityType};

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::semantic::CatalogIndex;

/// All semantic models and metrics for one run.
///
/// Built once and never mutated while analysis runs; every derived index
/// and join graph borrows from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub semantic_models: Vec<SemanticModel>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: SemanticModel) -> Self {
        self.semantic_models.push(model);
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Parse a catalog from JSON and check it is structurally sound.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Check name uniqueness across models, measures, metrics and primary entities.
    pub fn validate(&self) -> CatalogResult<()> {
        CatalogIndex::build(self).map(|_| ())
    }

    pub fn model(&self, name: &str) -> Option<&SemanticModel> {
        self.semantic_models.iter().find(|m| m.name == name)
    }

    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.semantic_models.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name.as_str()).collect()
    }
}
