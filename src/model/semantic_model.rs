//! Semantic models: entities plus the measures defined over them.

use serde::{Deserialize, Serialize};

use super::measure::Measure;
use super::types::EntityType;

/// A named join key on a semantic model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
}

impl Entity {
    pub fn primary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: EntityType::Primary,
        }
    }

    pub fn foreign(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: EntityType::Foreign,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.entity_type.is_primary()
    }
}

/// A semantic model: one logical table with its entities and measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticModel {
    pub name: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SemanticModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
            measures: Vec::new(),
            description: None,
        }
    }

    pub fn with_primary_entity(mut self, name: impl Into<String>) -> Self {
        self.entities.push(Entity::primary(name));
        self
    }

    pub fn with_foreign_entity(mut self, name: impl Into<String>) -> Self {
        self.entities.push(Entity::foreign(name));
        self
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The model's join anchor, if it declares one.
    pub fn primary_entity(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_primary())
    }

    /// Foreign entities in declaration order.
    pub fn foreign_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| !e.is_primary())
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }

    pub fn has_measure(&self, name: &str) -> bool {
        self.measure(name).is_some()
    }
}
