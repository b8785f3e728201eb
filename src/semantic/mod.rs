//! Semantic analysis - indexes, join reachability, and metric dependencies.
//!
//! Everything here is a pure function of an immutable [`Catalog`]:
//!
//! 1. **Index** - name lookups for models, measures, primary entities, metrics
//! 2. **Join graph** - bounded breadth-first reachability from an anchor entity
//! 3. **Dependencies** - the measures a metric needs, directly or through parents
//! 4. **Eligibility** - whether those measures all come from one model
//!
//! [`Catalog`]: crate::model::Catalog

pub mod dependencies;
pub mod eligibility;
pub mod index;
pub mod join_graph;

pub use dependencies::{measure_closure, measure_dependencies, DependencyError};
pub use eligibility::{Eligibility, MetricEligibilityResolver};
pub use index::CatalogIndex;
pub use join_graph::{JoinGraph, ReachableModel, RelationshipGraph, DEFAULT_MAX_HOPS};
