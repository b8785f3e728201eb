//! Read-only lookup tables over a [`Catalog`].
//!
//! The index is built once per run and then shared (by reference) between
//! the eligibility resolver, the join graphs and every validation worker.

use std::collections::HashMap;

use crate::model::{Catalog, CatalogError, CatalogResult, Metric, SemanticModel};

use super::join_graph::RelationshipGraph;

/// Name-keyed views of a catalog plus its relationship graph.
#[derive(Debug)]
pub struct CatalogIndex<'a> {
    catalog: &'a Catalog,
    models: HashMap<&'a str, &'a SemanticModel>,
    /// Measure name -> owning model
    measures: HashMap<&'a str, &'a SemanticModel>,
    /// Primary entity name -> owning model
    primary_entities: HashMap<&'a str, &'a SemanticModel>,
    metrics: HashMap<&'a str, &'a Metric>,
    relationships: RelationshipGraph,
}

impl<'a> CatalogIndex<'a> {
    /// Index `catalog`, rejecting duplicate names.
    pub fn build(catalog: &'a Catalog) -> CatalogResult<Self> {
        let mut models = HashMap::new();
        let mut measures: HashMap<&str, &SemanticModel> = HashMap::new();
        let mut primary_entities: HashMap<&str, &SemanticModel> = HashMap::new();

        for model in &catalog.semantic_models {
            if models.insert(model.name.as_str(), model).is_some() {
                return Err(CatalogError::DuplicateModel(model.name.clone()));
            }

            let mut primaries = model.entities.iter().filter(|e| e.is_primary());
            if let Some(primary) = primaries.next() {
                if primaries.next().is_some() {
                    return Err(CatalogError::MultiplePrimaryEntities(model.name.clone()));
                }
                if let Some(first) = primary_entities.insert(primary.name.as_str(), model) {
                    return Err(CatalogError::DuplicatePrimaryEntity {
                        entity: primary.name.clone(),
                        first_model: first.name.clone(),
                        second_model: model.name.clone(),
                    });
                }
            }

            for measure in &model.measures {
                if let Some(first) = measures.insert(measure.name.as_str(), model) {
                    return Err(CatalogError::DuplicateMeasure {
                        measure: measure.name.clone(),
                        first_model: first.name.clone(),
                        second_model: model.name.clone(),
                    });
                }
            }
        }

        let mut metrics = HashMap::new();
        for metric in &catalog.metrics {
            if metrics.insert(metric.name.as_str(), metric).is_some() {
                return Err(CatalogError::DuplicateMetric(metric.name.clone()));
            }
        }

        let relationships = RelationshipGraph::build(&catalog.semantic_models, &primary_entities);

        Ok(Self {
            catalog,
            models,
            measures,
            primary_entities,
            metrics,
            relationships,
        })
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn model(&self, name: &str) -> Option<&'a SemanticModel> {
        self.models.get(name).copied()
    }

    /// The model that defines measure `name`.
    pub fn measure_model(&self, name: &str) -> Option<&'a SemanticModel> {
        self.measures.get(name).copied()
    }

    /// The model whose primary entity is `entity`.
    pub fn model_for_primary_entity(&self, entity: &str) -> Option<&'a SemanticModel> {
        self.primary_entities.get(entity).copied()
    }

    pub fn is_primary_entity(&self, entity: &str) -> bool {
        self.primary_entities.contains_key(entity)
    }

    pub fn metric(&self, name: &str) -> Option<&'a Metric> {
        self.metrics.get(name).copied()
    }

    pub fn relationships(&self) -> &RelationshipGraph {
        &self.relationships
    }

    /// All primary entity names, sorted.
    pub fn primary_entity_names(&self) -> Vec<&'a str> {
        let mut names: Vec<_> = self.primary_entities.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// All measure names, sorted.
    pub fn measure_names(&self) -> Vec<&'a str> {
        let mut names: Vec<_> = self.measures.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// All metric names, sorted.
    pub fn metric_names(&self) -> Vec<&'a str> {
        let mut names: Vec<_> = self.metrics.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
