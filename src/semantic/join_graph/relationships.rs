//! Model-level relationship graph.
//!
//! Nodes are semantic models; a directed edge `a -> b` exists when model `a`
//! declares a foreign entity that is the primary entity of model `b`. This
//! graph is built once per catalog and shared by every [`JoinGraph`].
//!
//! [`JoinGraph`]: super::JoinGraph

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::model::SemanticModel;

/// A semantic model in the relationship graph.
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: String,
    pub primary_entity: Option<String>,
}

/// A foreign-key edge, labelled with the entity it joins through.
#[derive(Debug, Clone)]
pub struct RelationshipEdge {
    pub entity: String,
}

/// Directed graph of foreign-entity joins between semantic models.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    graph: DiGraph<ModelNode, RelationshipEdge>,
    node_indices: HashMap<String, NodeIndex>,
    /// (model, entity) pairs whose foreign entity matches no primary entity.
    dangling: Vec<(String, String)>,
}

impl RelationshipGraph {
    /// Build the graph from the catalog's models.
    ///
    /// `primary_entities` maps each primary entity name to the model that
    /// owns it. Foreign entities with no owner are recorded as dangling and
    /// contribute no edge.
    pub fn build(
        models: &[SemanticModel],
        primary_entities: &HashMap<&str, &SemanticModel>,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for model in models {
            let idx = graph.add_node(ModelNode {
                name: model.name.clone(),
                primary_entity: model.primary_entity().map(|e| e.name.clone()),
            });
            node_indices.insert(model.name.clone(), idx);
        }

        let mut dangling = Vec::new();
        for model in models {
            let from_idx = node_indices[&model.name];
            for entity in model.foreign_entities() {
                match primary_entities.get(entity.name.as_str()) {
                    Some(target) => {
                        let to_idx = node_indices[&target.name];
                        graph.add_edge(
                            from_idx,
                            to_idx,
                            RelationshipEdge {
                                entity: entity.name.clone(),
                            },
                        );
                    }
                    None => {
                        debug!(
                            model = %model.name,
                            entity = %entity.name,
                            "foreign entity has no primary owner"
                        );
                        dangling.push((model.name.clone(), entity.name.clone()));
                    }
                }
            }
        }

        Self {
            graph,
            node_indices,
            dangling,
        }
    }

    pub fn model_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn relationship_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }

    /// Outgoing joins of `model` as `(entity, target_model)` pairs, in the
    /// order the foreign entities were declared.
    pub fn joins_from(&self, model: &str) -> Vec<(&str, &str)> {
        let Some(&idx) = self.node_indices.get(model) else {
            return Vec::new();
        };

        // petgraph yields adjacency in reverse insertion order
        let mut edges: Vec<_> = self.graph.edges(idx).collect();
        edges.sort_by_key(|edge| edge.id());

        edges
            .into_iter()
            .map(|edge| {
                (
                    edge.weight().entity.as_str(),
                    self.graph[edge.target()].name.as_str(),
                )
            })
            .collect()
    }

    /// Foreign entities that reference no known primary entity.
    pub fn dangling_foreign_entities(&self) -> &[(String, String)] {
        &self.dangling
    }
}
