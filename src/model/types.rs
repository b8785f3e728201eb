//! Primitive model types shared by entities and measures.

use serde::{Deserialize, Serialize};

/// Role an entity plays inside its owning semantic model.
///
/// A model's primary entity is its join anchor. A foreign entity names the
/// primary entity of some other model and is the edge used to join to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Primary,
    Foreign,
}

impl EntityType {
    pub fn is_primary(&self) -> bool {
        matches!(self, EntityType::Primary)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Primary => "primary",
            EntityType::Foreign => "foreign",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregation applied by a measure.
///
/// The analysis core never interprets this; it is carried so the emission
/// layer can pick the matching target-language measure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationType {
    Sum,
    Count,
    CountDistinct,
    #[serde(alias = "avg")]
    Average,
    Min,
    Max,
    Median,
    SumBoolean,
    Percentile,
}

impl AggregationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Count => "count",
            AggregationType::CountDistinct => "count_distinct",
            AggregationType::Average => "average",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
            AggregationType::Median => "median",
            AggregationType::SumBoolean => "sum_boolean",
            AggregationType::Percentile => "percentile",
        }
    }
}

impl std::fmt::Display for AggregationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
