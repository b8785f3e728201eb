//! Entity connectivity validation scenarios.

use metric_bridge::model::{Catalog, Measure, Metric, SemanticModel};
use metric_bridge::semantic::CatalogIndex;
use metric_bridge::validation::{
    ConnectivityOptions, EntityConnectivityValidator, IssueKind, Severity,
};

/// `orders` and `searches` share no relationship.
fn funnel_catalog() -> Catalog {
    Catalog::new()
        .with_model(
            SemanticModel::new("orders")
                .with_primary_entity("order")
                .with_measure(Measure::count("order_count", "order_id")),
        )
        .with_model(
            SemanticModel::new("searches")
                .with_primary_entity("search")
                .with_measure(Measure::count("search_count", "search_id")),
        )
        .with_metric(
            Metric::ratio("conv_rate", "order_count", "search_count").with_primary_entity("search"),
        )
}

/// rentals -> users
fn rentals_catalog() -> Catalog {
    Catalog::new()
        .with_model(
            SemanticModel::new("rentals")
                .with_primary_entity("rental")
                .with_foreign_entity("user")
                .with_measure(Measure::count("rental_count", "rental_id")),
        )
        .with_model(
            SemanticModel::new("users")
                .with_primary_entity("user")
                .with_measure(Measure::count("user_count", "user_id")),
        )
        .with_metric(Metric::simple("renting_users", "user_count").with_primary_entity("rental"))
        .with_metric(
            Metric::ratio("rentals_per_user", "rental_count", "user_count").with_primary_entity("rental"),
        )
}

#[test]
fn test_cross_model_ratio_reports_one_unreachable_measure() {
    let catalog = funnel_catalog();
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    let result = validator.validate_metric(index.metric("conv_rate").unwrap());

    assert_eq!(result.len(), 1);
    let issue = &result.issues()[0];
    assert_eq!(issue.severity, Severity::Error);
    assert_eq!(issue.kind, IssueKind::UnreachableMeasure);
    assert_eq!(issue.metric_name, "conv_rate");
    assert_eq!(issue.context.measure_name.as_deref(), Some("order_count"));
    assert_eq!(issue.context.model_name.as_deref(), Some("orders"));
    assert!(issue.message.contains("'order_count'"));
    assert!(issue.message.contains("'orders'"));
    assert!(issue.message.contains("'search'"));
    assert_eq!(issue.suggestions.len(), 3);
}

#[test]
fn test_inferred_anchor_matches_declared() {
    let mut catalog = funnel_catalog();
    catalog.metrics[0].primary_entity = None;
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    let result = validator.validate_all();
    assert_eq!(result.len(), 1);
    assert_eq!(result.issues()[0].kind, IssueKind::UnreachableMeasure);
    assert_eq!(result.issues()[0].context.primary_entity.as_deref(), Some("search"));
}

#[test]
fn test_one_hop_join_produces_no_issues() {
    let catalog = rentals_catalog();
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    let result = validator.validate_all();
    assert!(result.is_empty(), "{}", result);
    assert_eq!(validator.join_graph("rental").hop_count("users"), Some(1));
}

#[test]
fn test_reverse_direction_is_unreachable() {
    let catalog = rentals_catalog()
        .with_metric(Metric::simple("rentals_by_user", "rental_count").with_primary_entity("user"));
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    let result = validator.validate_metric(index.metric("rentals_by_user").unwrap());
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.issues()[0].kind, IssueKind::UnreachableMeasure);
}

#[test]
fn test_tighter_budget_makes_measure_unreachable() {
    let catalog = rentals_catalog()
        .with_model(
            SemanticModel::new("payments")
                .with_primary_entity("payment")
                .with_foreign_entity("rental")
                .with_measure(Measure::sum("amount_paid", "amount")),
        )
        .with_metric(
            Metric::ratio("paid_per_user", "amount_paid", "user_count").with_primary_entity("payment"),
        );
    let index = CatalogIndex::build(&catalog).unwrap();
    let metric = index.metric("paid_per_user").unwrap();

    // payments -> rentals -> users is two hops
    let default = EntityConnectivityValidator::new(&index);
    assert!(default.validate_metric(metric).is_empty());

    let tight = EntityConnectivityValidator::with_options(
        &index,
        ConnectivityOptions {
            max_hops: 1,
            recommended_hops: 1,
        },
    );
    let result = tight.validate_metric(metric);
    assert_eq!(result.len(), 1);
    assert_eq!(result.issues()[0].context.measure_name.as_deref(), Some("user_count"));
}

#[test]
fn test_invalid_anchor_lists_available_entities() {
    let catalog = rentals_catalog()
        .with_metric(Metric::simple("bad", "rental_count").with_primary_entity("rentl"));
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    let result = validator.validate_metric(index.metric("bad").unwrap());
    assert_eq!(result.len(), 1);
    let issue = &result.issues()[0];
    assert_eq!(issue.kind, IssueKind::InvalidPrimaryEntity);
    assert_eq!(issue.context.available_entities, vec!["rental", "user"]);
    assert_eq!(issue.suggestions[0], "Did you mean 'rental'?");
}

#[test]
fn test_missing_measures_reported_together() {
    let catalog = rentals_catalog().with_metric(
        Metric::ratio("ghost", "rentl_count", "nothing_here").with_primary_entity("rental"),
    );
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    let result = validator.validate_metric(index.metric("ghost").unwrap());
    assert_eq!(result.len(), 1);
    let issue = &result.issues()[0];
    assert_eq!(issue.kind, IssueKind::MissingMeasure);
    assert_eq!(issue.context.missing_measures, vec!["nothing_here", "rentl_count"]);
    assert!(issue
        .suggestions
        .iter()
        .any(|s| s == "Did you mean 'rental_count' instead of 'rentl_count'?"));
}

#[test]
fn test_self_reference_is_cyclic() {
    let catalog = rentals_catalog()
        .with_metric(Metric::derived("loop", "loop + 1", ["loop"]).with_primary_entity("rental"));
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    let result = validator.validate_metric(index.metric("loop").unwrap());
    assert_eq!(result.len(), 1);
    assert_eq!(result.issues()[0].kind, IssueKind::CyclicDependency);
    assert!(result.issues()[0].message.contains("loop -> loop"));
}

#[test]
fn test_unknown_parent_metric() {
    let catalog = rentals_catalog().with_metric(
        Metric::derived("combo", "a + b", ["renting_users", "renting_user"]).with_primary_entity("rental"),
    );
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    let result = validator.validate_metric(index.metric("combo").unwrap());
    assert_eq!(result.len(), 1);
    let issue = &result.issues()[0];
    assert_eq!(issue.kind, IssueKind::MissingMetric);
    assert_eq!(issue.suggestions[0], "Did you mean 'renting_users'?");
}

#[test]
fn test_derived_metric_checks_every_parent_measure() {
    let catalog = funnel_catalog()
        .with_metric(Metric::simple("orders", "order_count"))
        .with_metric(Metric::simple("searches", "search_count"))
        .with_metric(
            Metric::derived("funnel", "orders / searches", ["orders", "searches"])
                .with_primary_entity("order"),
        );
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    let result = validator.validate_metric(index.metric("funnel").unwrap());
    assert_eq!(result.len(), 1);
    assert_eq!(result.issues()[0].context.measure_name.as_deref(), Some("search_count"));
}

#[test]
fn test_conversion_metrics_are_skipped() {
    let catalog = funnel_catalog().with_metric(Metric::conversion(
        "search_to_order",
        "search",
        "search_count",
        "order_count",
    ));
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    assert!(validator
        .validate_metric(index.metric("search_to_order").unwrap())
        .is_empty());
}

#[test]
fn test_batch_keeps_going_after_failure() {
    let catalog = funnel_catalog()
        .with_metric(Metric::simple("no_anchor", "order_count"))
        .with_metric(Metric::simple("orders", "order_count").with_primary_entity("order"))
        .with_metric(Metric::simple("searches", "search_count").with_primary_entity("order"));
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);

    let result = validator.validate_all();
    assert_eq!(result.failing_metrics(), vec!["conv_rate", "no_anchor", "searches"]);
    assert!(result.issues_for("orders").next().is_none());
}

#[test]
fn test_validation_is_idempotent() {
    let catalog = funnel_catalog();
    let index = CatalogIndex::build(&catalog).unwrap();
    let validator = EntityConnectivityValidator::new(&index);
    let metric = index.metric("conv_rate").unwrap();

    let first = validator.validate_metric(metric);
    let second = validator.validate_metric(metric);
    assert_eq!(first, second);
    assert_eq!(first.format_report(), second.format_report());
}

#[test]
fn test_parallel_matches_sequential() {
    let mut catalog = rentals_catalog();
    for i in 0..20 {
        let anchor = if i % 2 == 0 { "rental" } else { "user" };
        catalog = catalog.with_metric(
            Metric::ratio(format!("m{i}"), "rental_count", "user_count").with_primary_entity(anchor),
        );
    }
    let index = CatalogIndex::build(&catalog).unwrap();
    let metrics: Vec<&Metric> = catalog.metrics.iter().collect();

    let sequential = EntityConnectivityValidator::new(&index).validate_metrics(metrics.iter().copied());
    for workers in [1, 2, 3, 8, 64] {
        let validator = EntityConnectivityValidator::new(&index);
        let parallel = validator.validate_metrics_parallel(&metrics, workers);
        assert_eq!(parallel, sequential, "workers = {workers}");
    }
    assert_eq!(sequential.error_count(), 10);
}
