//! # metric_bridge
//!
//! Semantic analysis for translating semantic-model metrics into a BI
//! configuration language.
//!
//! ## Architecture
//!
//! Given a catalog of semantic models and metrics, the crate decides which
//! metrics can be expressed from their anchor entity, and explains the ones
//! that cannot:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                Catalog (models + metrics)                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [index]
//! ┌─────────────────────────────────────────────────────────┐
//! │     CatalogIndex + RelationshipGraph (petgraph)          │
//! └─────────────────────────────────────────────────────────┘
//!                │                              │
//!                ▼ [bfs per anchor]             ▼ [dependency closure]
//! ┌───────────────────────────┐  ┌───────────────────────────┐
//! │         JoinGraph          │  │ MetricEligibilityResolver │
//! └───────────────────────────┘  └───────────────────────────┘
//!                │
//!                ▼ [connectivity checks]
//! ┌─────────────────────────────────────────────────────────┐
//! │       ValidationResult (issues, report, JSON)            │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod model;
pub mod semantic;
pub mod validation;

pub use config::{Settings, SettingsError};
pub use model::{Catalog, CatalogError, Metric, MetricKind, SemanticModel};
pub use semantic::{CatalogIndex, Eligibility, JoinGraph, MetricEligibilityResolver, DEFAULT_MAX_HOPS};
pub use validation::{
    ConnectivityOptions, EntityConnectivityValidator, IssueKind, Severity, ValidationIssue,
    ValidationResult,
};
