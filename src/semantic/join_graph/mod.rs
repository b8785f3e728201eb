//! JoinGraph - bounded reachability from one anchor entity.
//!
//! A join graph answers "which models (and entities) can a metric anchored
//! on entity X reach, and in how many hops?". It is computed breadth-first
//! over the catalog's [`RelationshipGraph`], so the first time a model is
//! discovered is also its shortest hop count. Each model is visited at most
//! once, which bounds the work even when relationships form cycles.
//!
//! The module is organized into submodules:
//! - `relationships`: the model-level foreign-key graph built once per catalog

mod relationships;


pub use relationships::{ModelNode, RelationshipEdge, RelationshipGraph};

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::semantic::CatalogIndex;

/// Default number of foreign-key edges a reachability search will cross.
pub const DEFAULT_MAX_HOPS: usize = 2;

/// Models and entities reachable from one anchor entity.
///
/// Immutable after [`JoinGraph::build`]; every query is a map lookup.
#[derive(Debug, Clone, Default)]
pub struct JoinGraph {
    anchor_entity: String,
    anchor_model: Option<String>,
    max_hops: usize,
    /// Reachable model name -> hop count
    models: HashMap<String, usize>,
    /// Reachable entity name -> hop count
    entities: HashMap<String, usize>,
}

/// One row of a reachability map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReachableModel {
    pub model: String,
    pub hops: usize,
}

impl JoinGraph {
    /// Compute reachability from `anchor_entity` within `max_hops` joins.
    ///
    /// If no model declares `anchor_entity` as its primary entity the result
    /// is an empty graph; callers treat emptiness as an invalid anchor.
    pub fn build(anchor_entity: &str, index: &CatalogIndex<'_>, max_hops: usize) -> Self {
        let Some(anchor_model) = index.model_for_primary_entity(anchor_entity) else {
            debug!(anchor = anchor_entity, "no model owns anchor entity");
            return Self {
                anchor_entity: anchor_entity.to_string(),
                max_hops,
                ..Self::default()
            };
        };

        let relationships = index.relationships();
        let mut models = HashMap::new();
        let mut entities = HashMap::new();
        let mut queue = VecDeque::new();

        models.insert(anchor_model.name.clone(), 0);
        entities.insert(anchor_entity.to_string(), 0);
        queue.push_back((anchor_model.name.as_str(), 0));

        while let Some((model, depth)) = queue.pop_front() {
            if depth >= max_hops {
                continue;
            }

            for (entity, target) in relationships.joins_from(model) {
                if models.contains_key(target) {
                    continue;
                }

                models.insert(target.to_string(), depth + 1);
                entities.entry(entity.to_string()).or_insert(depth + 1);
                queue.push_back((target, depth + 1));
            }
        }

        debug!(
            anchor = anchor_entity,
            reachable_models = models.len(),
            max_hops,
            "built join graph"
        );

        Self {
            anchor_entity: anchor_entity.to_string(),
            anchor_model: Some(anchor_model.name.clone()),
            max_hops,
            models,
            entities,
        }
    }

    pub fn anchor_entity(&self) -> &str {
        &self.anchor_entity
    }

    /// The model whose primary entity is the anchor.
    pub fn anchor_model(&self) -> Option<&str> {
        self.anchor_model.as_deref()
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// True when the anchor did not resolve to any model.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn is_model_reachable(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn is_entity_reachable(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    /// Shortest hop count from the anchor model to `model`.
    pub fn hop_count(&self, model: &str) -> Option<usize> {
        self.models.get(model).copied()
    }

    pub fn entity_hop_count(&self, entity: &str) -> Option<usize> {
        self.entities.get(entity).copied()
    }

    /// Reachable models ordered by hop count, then name.
    pub fn reachable_models(&self) -> Vec<ReachableModel> {
        let mut rows: Vec<_> = self
            .models
            .iter()
            .map(|(model, &hops)| ReachableModel {
                model: model.clone(),
                hops,
            })
            .collect();
        rows.sort_by(|a, b| a.hops.cmp(&b.hops).then_with(|| a.model.cmp(&b.model)));
        rows
    }

    /// Reachable entity names, sorted.
    pub fn reachable_entities(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.entities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
