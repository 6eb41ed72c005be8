//! Property-style tests for the allocator and validator
//!
//! These sweep budgets and caps over small fixed catalogs and check the
//! guarantees every plan must keep.

use planner::core::validator::validate;
use planner::SeedAllocator;
use shared::{ClusterMap, Sku, StoreId, ViolationKind};

mod common;
use common::{TestFixtures, TestHelpers};

const CAPS: [i64; 5] = [0, 1, 2, 3, 10];

/// Test worked example: budget 25, two SKUs, two stores
#[test]
fn test_budget_25_gives_one_sku_per_store() {
    let plan = SeedAllocator::new()
        .allocate(
            &TestFixtures::two_sku_catalog(),
            &TestFixtures::two_stores(),
            &TestHelpers::constraints(TestFixtures::DEFAULT_BUDGET, TestFixtures::DEFAULT_CAP),
        )
        .unwrap();

    assert_eq!(
        TestHelpers::pairs(&plan),
        vec![
            ("S1".to_string(), "SKU1".to_string()),
            ("S2".to_string(), "SKU1".to_string())
        ]
    );
    assert_eq!(plan.total_spend, 20.0);
    assert_eq!(plan.budget_left, 5.0);
}

/// Test worked example: budget below the cheapest SKU
#[test]
fn test_budget_below_cheapest_sku_is_empty() {
    let plan = SeedAllocator::new()
        .allocate(
            &TestFixtures::two_sku_catalog(),
            &TestFixtures::two_stores(),
            &TestHelpers::constraints(5.0, 3),
        )
        .unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.total_spend, 0.0);
}

/// Test that every plan respects both caps
#[test]
fn test_plans_never_exceed_caps() {
    let catalog = TestFixtures::mixed_catalog();
    let map = TestFixtures::five_stores();

    for cap in CAPS {
        for budget in (0..=80).map(f64::from) {
            let constraints = TestHelpers::constraints(budget, cap);
            let plan = SeedAllocator::new().allocate(&catalog, &map, &constraints).unwrap();

            assert!(plan.total_spend <= budget, "spend {} over budget {}", plan.total_spend, budget);
            assert_eq!(plan.budget_left, budget - plan.total_spend);
            for (store, count) in plan.distinct_skus_per_store() {
                assert!(count as i64 <= cap, "store {store} has {count} SKUs with cap {cap}");
            }
            for line in &plan.lines {
                assert!(map.contains(&line.store_id));
            }
        }
    }
}

/// Test that allocator output always passes validation
#[test]
fn test_allocator_output_validates_clean() {
    let catalog = TestFixtures::mixed_catalog();
    let map = TestFixtures::five_stores();

    for cap in CAPS {
        for budget in [0.0, 1.0, 6.5, 17.0, 43.0, 1000.0] {
            let constraints = TestHelpers::constraints(budget, cap);
            let plan = SeedAllocator::new().allocate(&catalog, &map, &constraints).unwrap();
            let report = validate(&plan.lines, &catalog, &constraints).unwrap();
            assert!(report.is_ok(), "budget {budget} cap {cap}: {:?}", report.violations);
        }
    }
}

/// Test that identical inputs give identical plans
#[test]
fn test_allocation_is_deterministic() {
    let catalog = TestFixtures::mixed_catalog();
    let map = TestFixtures::five_stores();
    let constraints = TestHelpers::constraints(30.0, 2);

    let first = SeedAllocator::new().allocate(&catalog, &map, &constraints).unwrap();
    let second = SeedAllocator::new().allocate(&catalog, &map, &constraints).unwrap();
    assert_eq!(first, second);
}

/// Test that cluster map insertion order does not matter
#[test]
fn test_store_order_is_by_id_not_insertion() {
    let forward: ClusterMap = [("S1", 0), ("S2", 1), ("S3", 0)].into_iter().collect();
    let backward: ClusterMap = [("S3", 0), ("S2", 1), ("S1", 0)].into_iter().collect();
    let constraints = TestHelpers::constraints(25.0, 2);
    let catalog = TestFixtures::mixed_catalog();

    let a = SeedAllocator::new().allocate(&catalog, &forward, &constraints).unwrap();
    let b = SeedAllocator::new().allocate(&catalog, &backward, &constraints).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.lines[0].store_id, StoreId::from("S1"));
}

/// Test that lowering the budget never raises spend
#[test]
fn test_lower_budget_never_raises_spend() {
    let catalog = TestFixtures::mixed_catalog();
    let map = TestFixtures::five_stores();

    for cap in CAPS {
        let mut previous: Option<f64> = None;
        for budget in (0..=120).rev().map(f64::from) {
            let spend = SeedAllocator::new()
                .allocate(&catalog, &map, &TestHelpers::constraints(budget, cap))
                .unwrap()
                .total_spend;
            if let Some(higher_budget_spend) = previous {
                assert!(spend <= higher_budget_spend, "cap {cap}: budget {budget} spent {spend}");
            }
            previous = Some(spend);
        }
    }
}

/// Test that lowering the cap never raises the largest per-store count
#[test]
fn test_lower_cap_never_raises_widest_store() {
    let catalog = TestFixtures::mixed_catalog();
    let map = TestFixtures::five_stores();

    for budget in [5.0, 20.0, 60.0, 500.0] {
        let mut previous: Option<usize> = None;
        for cap in (0..=8).rev() {
            let plan = SeedAllocator::new()
                .allocate(&catalog, &map, &TestHelpers::constraints(budget, cap))
                .unwrap();
            let widest = plan.distinct_skus_per_store().values().copied().max().unwrap_or(0);
            if let Some(higher_cap_widest) = previous {
                assert!(widest <= higher_cap_widest);
            }
            previous = Some(widest);
        }
    }
}

/// Test the known greedy gap: a tighter cap can spread budget further
#[test]
fn test_lower_sku_cap_can_spread_budget_across_more_stores() {
    let catalog = vec![Sku::new("A", 5.0), Sku::new("B", 4.0)];
    let map = TestFixtures::two_stores();

    let wide = SeedAllocator::new()
        .allocate(&catalog, &map, &TestHelpers::constraints(10.0, 2))
        .unwrap();
    let narrow = SeedAllocator::new()
        .allocate(&catalog, &map, &TestHelpers::constraints(10.0, 1))
        .unwrap();

    // cap 2: S1 takes A and B, nothing fits S2
    assert_eq!(wide.total_spend, 9.0);
    assert_eq!(wide.lines.len(), 2);
    // cap 1: S1 takes A, S2 takes A
    assert_eq!(narrow.total_spend, 10.0);
    assert_eq!(narrow.distinct_skus_per_store().len(), 2);

    // the same gap holds per store: S2 goes from no SKUs to one
    let s2 = StoreId::from("S2");
    assert_eq!(wide.distinct_skus_per_store().get(&s2), None);
    assert_eq!(narrow.distinct_skus_per_store().get(&s2), Some(&1));
}

/// Test worked example: four SKUs in one store with a cap of three
#[test]
fn test_hand_edited_lines_over_cap_report_overage() {
    let catalog: Vec<Sku> = (1..=4).map(|i| Sku::new(format!("SKU{i}"), 1.0)).collect();
    let lines: Vec<_> = (1..=4).map(|i| TestHelpers::line(&format!("SKU{i}"), "S1", 1)).collect();

    let report = validate(&lines, &catalog, &TestHelpers::constraints(100.0, 3)).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report.violations[0].kind, ViolationKind::SkuCapExceeded);
    assert_eq!(report.violations[0].overage, 1.0);
    assert!(!report.suggestions().is_empty());
}

/// Test worked example: spend 600 against a budget of 500
#[test]
fn test_hand_edited_lines_over_budget_report_overage() {
    let catalog = vec![Sku::new("SKU1", 100.0), Sku::new("SKU2", 200.0)];
    let lines = vec![TestHelpers::line("SKU1", "S1", 2), TestHelpers::line("SKU2", "S2", 2)];

    let report = validate(&lines, &catalog, &TestHelpers::constraints(500.0, 10)).unwrap();
    assert_eq!(report.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.kind, ViolationKind::BudgetExceeded);
    assert_eq!((violation.observed, violation.limit, violation.overage), (600.0, 500.0, 100.0));
}

/// Test worked example: an unknown SKU is a fault, not a violation
#[test]
fn test_unknown_sku_is_lookup_error() {
    let catalog = TestFixtures::two_sku_catalog();
    let lines = vec![TestHelpers::line("SKU_X", "S1", 1)];

    let err = validate(&lines, &catalog, &TestHelpers::constraints(100.0, 3)).unwrap_err();
    assert!(err.is_lookup());
    assert!(err.to_string().contains("SKU_X"));
}

/// Test that validating twice gives the same report
#[test]
fn test_validation_is_idempotent() {
    let catalog = TestFixtures::mixed_catalog();
    let lines: Vec<_> = catalog
        .iter()
        .flat_map(|sku| ["S1", "S2"].map(|store| TestHelpers::line(sku.id.as_str(), store, 2)))
        .collect();
    let constraints = TestHelpers::constraints(50.0, 4);

    let first = validate(&lines, &catalog, &constraints).unwrap();
    let second = validate(&lines, &catalog, &constraints).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}
