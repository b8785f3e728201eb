//! Same-model eligibility across derived metric chains.

use std::time::{Duration, Instant};

use metric_bridge::model::{Catalog, Measure, Metric, SemanticModel};
use metric_bridge::semantic::{measure_closure, CatalogIndex, Eligibility, MetricEligibilityResolver};
use proptest::prelude::*;

/// `a` and `b` are simple metrics; `ab` is derived from both.
fn ab_catalog(b_model_entity: &str) -> Catalog {
    let mut catalog = Catalog::new().with_model(
        SemanticModel::new("facts")
            .with_primary_entity("e")
            .with_measure(Measure::sum("measure_a", "a")),
    );
    catalog = if b_model_entity == "e" {
        let mut facts = catalog.semantic_models.remove(0);
        facts = facts.with_measure(Measure::sum("measure_b", "b"));
        catalog.with_model(facts)
    } else {
        catalog.with_model(
            SemanticModel::new("other_facts")
                .with_primary_entity(b_model_entity)
                .with_measure(Measure::sum("measure_b", "b")),
        )
    };

    catalog
        .with_metric(Metric::simple("a", "measure_a"))
        .with_metric(Metric::simple("b", "measure_b"))
        .with_metric(Metric::derived("ab", "a + b", ["a", "b"]))
}

#[test]
fn test_derived_over_same_model_is_eligible() {
    let catalog = ab_catalog("e");
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);

    let ab = index.metric("ab").unwrap();
    assert_eq!(resolver.is_eligible(ab), (true, Some("e".to_string())));
}

#[test]
fn test_moving_parent_to_other_anchor_flips_result() {
    let catalog = ab_catalog("e2");
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);

    assert_eq!(resolver.is_eligible(index.metric("ab").unwrap()), (false, None));
    // each parent on its own is still fine
    assert_eq!(resolver.resolve_by_name("a").anchor_entity(), Some("e"));
    assert_eq!(resolver.resolve_by_name("b").anchor_entity(), Some("e2"));
}

#[test]
fn test_deep_derived_chain_is_eligible() {
    let mut catalog = Catalog::new()
        .with_model(
            SemanticModel::new("orders")
                .with_primary_entity("order")
                .with_measure(Measure::sum("revenue", "amount")),
        )
        .with_metric(Metric::simple("level_0", "revenue"));
    for level in 1..=5 {
        catalog = catalog.with_metric(Metric::derived(
            format!("level_{level}"),
            "x * 2",
            [format!("level_{}", level - 1)],
        ));
    }
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);

    for level in 3..=5 {
        assert_eq!(
            resolver.resolve_by_name(&format!("level_{level}")),
            Eligibility::Eligible {
                anchor_entity: "order".into()
            }
        );
    }
}

#[test]
fn test_diamond_is_not_a_cycle() {
    // top -> (left, right) -> base
    let catalog = Catalog::new()
        .with_model(
            SemanticModel::new("orders")
                .with_primary_entity("order")
                .with_measure(Measure::count("order_count", "order_id")),
        )
        .with_metric(Metric::simple("base", "order_count"))
        .with_metric(Metric::derived("left", "base", ["base"]))
        .with_metric(Metric::derived("right", "base", ["base"]))
        .with_metric(Metric::derived("top", "left + right", ["left", "right"]));
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);

    assert!(resolver.resolve_by_name("top").qualifies());
}

#[test]
fn test_self_reference_is_ineligible() {
    let catalog = Catalog::new()
        .with_model(
            SemanticModel::new("orders")
                .with_primary_entity("order")
                .with_measure(Measure::count("order_count", "order_id")),
        )
        .with_metric(Metric::simple("orders", "order_count"))
        .with_metric(Metric::derived("loop", "loop + orders", ["loop", "orders"]));
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);

    assert_eq!(resolver.resolve_by_name("loop"), Eligibility::Ineligible);
}

#[test]
fn test_mutual_recursion_is_ineligible() {
    let catalog = Catalog::new()
        .with_metric(Metric::derived("ping", "pong", ["pong"]))
        .with_metric(Metric::derived("pong", "ping", ["ping"]));
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);

    assert!(!resolver.resolve_by_name("ping").qualifies());
    assert!(!resolver.resolve_by_name("pong").qualifies());
}

#[test]
fn test_missing_parent_is_ineligible() {
    let catalog = ab_catalog("e").with_metric(Metric::derived("abc", "a + c", ["a", "c"]));
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);

    assert_eq!(resolver.resolve_by_name("abc"), Eligibility::Ineligible);
}

#[test]
fn test_derived_over_conversion_is_ineligible() {
    let catalog = ab_catalog("e")
        .with_metric(Metric::conversion("conv", "e", "measure_a", "measure_b"))
        .with_metric(Metric::derived("conv_plus_a", "conv + a", ["conv", "a"]));
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);

    assert_eq!(resolver.resolve_by_name("conv_plus_a"), Eligibility::Ineligible);
}

/// `levels` diamonds stacked on `level_0`: `left_i` and `right_i` both derive
/// from `level_{i-1}`, and `level_i` derives from the pair.
fn diamond_ladder(levels: usize, base_measure: &str) -> Catalog {
    let mut catalog = Catalog::new()
        .with_model(
            SemanticModel::new("orders")
                .with_primary_entity("order")
                .with_measure(Measure::count("order_count", "order_id")),
        )
        .with_model(
            SemanticModel::new("customers")
                .with_primary_entity("customer")
                .with_measure(Measure::count("customer_count", "customer_id")),
        )
        .with_metric(Metric::simple("level_0", base_measure));
    for i in 1..=levels {
        let below = format!("level_{}", i - 1);
        catalog = catalog
            .with_metric(Metric::derived(format!("left_{i}"), "x", [below.clone()]))
            .with_metric(Metric::derived(format!("right_{i}"), "x", [below]))
            .with_metric(Metric::derived(
                format!("level_{i}"),
                "left + right",
                [format!("left_{i}"), format!("right_{i}")],
            ));
    }
    catalog
}

#[test]
fn test_deep_diamond_ladder_resolves_quickly() {
    let catalog = diamond_ladder(40, "order_count");
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);
    let top = index.metric("level_40").unwrap();

    let started = Instant::now();
    let outcome = resolver.resolve(top);
    let closure = measure_closure(top, &index).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcome.anchor_entity(), Some("order"));
    assert_eq!(closure.into_iter().collect::<Vec<_>>(), vec!["order_count"]);
    // 2^40 paths if shared ancestors were walked again
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
}

#[test]
fn test_deep_diamond_ladder_with_cross_model_rung() {
    let catalog = diamond_ladder(40, "order_count")
        .with_metric(Metric::simple("customers", "customer_count"))
        .with_metric(Metric::derived("mixed", "level_40 / customers", ["level_40", "customers"]))
        .with_metric(Metric::derived("mixed_again", "mixed + level_39", ["mixed", "level_39"]));
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);

    assert_eq!(resolver.resolve_by_name("mixed"), Eligibility::Ineligible);
    assert_eq!(resolver.resolve_by_name("mixed_again"), Eligibility::Ineligible);
    assert_eq!(resolver.resolve_by_name("level_39").anchor_entity(), Some("order"));
    assert_eq!(resolver.resolve_by_name("customers").anchor_entity(), Some("customer"));
}

#[test]
fn test_cycle_above_shared_ancestor_stays_ineligible() {
    // top reaches base twice; base is fine, the ring above it is not
    let catalog = diamond_ladder(3, "order_count")
        .with_metric(Metric::derived("ring_a", "ring_b + level_3", ["level_3", "ring_b"]))
        .with_metric(Metric::derived("ring_b", "ring_a", ["ring_a"]))
        .with_metric(Metric::derived("top", "level_3 + ring_b", ["level_3", "ring_b"]));
    let index = CatalogIndex::build(&catalog).unwrap();
    let resolver = MetricEligibilityResolver::new(&index);

    assert!(!resolver.resolve_by_name("top").qualifies());
    assert!(!resolver.resolve_by_name("ring_b").qualifies());
    assert!(resolver.resolve_by_name("level_3").qualifies());
}

// ---------------------------------------------------------------------------
// Totality over arbitrary derived-metric graphs
// ---------------------------------------------------------------------------

/// `n` derived metrics `d{i}` whose parents are drawn from `d*` and `s0`.
fn derived_web(n: usize, parents: &[(usize, usize)]) -> Catalog {
    let mut catalog = Catalog::new()
        .with_model(
            SemanticModel::new("orders")
                .with_primary_entity("order")
                .with_measure(Measure::count("order_count", "order_id")),
        )
        .with_metric(Metric::simple("s0", "order_count"));

    for i in 0..n {
        let mut names: Vec<String> = parents
            .iter()
            .filter(|(from, _)| *from == i)
            .map(|(_, to)| if *to == n { "s0".to_string() } else { format!("d{to}") })
            .collect();
        if names.is_empty() {
            names.push("s0".to_string());
        }
        catalog = catalog.with_metric(Metric::derived(format!("d{i}"), "expr", names));
    }
    catalog
}

fn arb_web() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..7).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..=n), 0..(n * 3))))
}

proptest! {
    /// Resolution terminates for every metric, and any metric on a cycle
    /// is ineligible. With a single anchored model everything else qualifies.
    #[test]
    fn resolution_is_total((n, parents) in arb_web()) {
        let catalog = derived_web(n, &parents);
        let index = CatalogIndex::build(&catalog).unwrap();
        let resolver = MetricEligibilityResolver::new(&index);

        for metric in &catalog.metrics {
            let outcome = resolver.resolve(metric);
            let closure = measure_closure(metric, &index);
            prop_assert_eq!(
                outcome.qualifies(),
                closure.is_ok(),
                "metric {} with parents {:?}",
                metric.name,
                parents
            );
            if outcome.qualifies() {
                prop_assert_eq!(outcome.anchor_entity(), Some("order"));
            }
        }
    }
}
