//! Test helpers and builder patterns for planner tests

use std::path::{Path, PathBuf};

use ::planner::traits::{MockCatalogSource, MockExportWriter, MockPlanStore};
use ::planner::*;
use shared::{AllocationLine, Constraints, SeedPlan, Settings, Sku, Store};

use super::fixtures::TestFixtures;

/// Builder for planners wired with mocks
pub struct PlannerBuilder {
    settings: Settings,
    catalog: MockCatalogSource,
    exporter: MockExportWriter,
    plans: MockPlanStore,
}

impl PlannerBuilder {
    /// Planner whose catalog serves the fixture SKUs and grouped stores
    pub fn new() -> Self {
        let mut catalog = MockCatalogSource::new();
        catalog
            .expect_load_skus()
            .returning(|_| Ok(TestFixtures::two_sku_catalog()))
            .times(0..);
        catalog
            .expect_load_stores()
            .returning(|_, _| Ok(TestFixtures::grouped_stores()))
            .times(0..);

        Self {
            settings: Settings::default(),
            catalog,
            exporter: MockExportWriter::new(),
            plans: MockPlanStore::new(),
        }
    }

    pub fn with_skus(mut self, skus: Vec<Sku>) -> Self {
        let mut catalog = MockCatalogSource::new();
        catalog
            .expect_load_skus()
            .returning(move |_| Ok(skus.clone()))
            .times(0..);
        catalog
            .expect_load_stores()
            .returning(|_, _| Ok(TestFixtures::grouped_stores()))
            .times(0..);
        self.catalog = catalog;
        self
    }

    pub fn with_exporter(mut self, exporter: MockExportWriter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn with_plans(mut self, plans: MockPlanStore) -> Self {
        self.plans = plans;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> SeedPlanner<MockCatalogSource, MockExportWriter, MockPlanStore> {
        SeedPlanner::new(self.settings, self.catalog, self.exporter, self.plans).unwrap()
    }
}

/// Common test operations
pub struct TestHelpers;

impl TestHelpers {
    pub fn constraints(budget: f64, cap: i64) -> Constraints {
        Constraints::new(budget, cap).unwrap()
    }

    pub fn line(sku: &str, store: &str, qty: u32) -> AllocationLine {
        AllocationLine::new(sku, store, qty).unwrap()
    }

    /// (store, sku) pairs in plan order
    pub fn pairs(plan: &SeedPlan) -> Vec<(String, String)> {
        plan.lines
            .iter()
            .map(|l| (l.store_id.to_string(), l.sku_id.to_string()))
            .collect()
    }

    pub fn pipeline_input(stores: Vec<Store>, catalog: Vec<Sku>, budget: f64, cap: i64) -> PipelineInput {
        PipelineInput {
            plan_id: "test_plan".to_string(),
            stores,
            catalog,
            constraints: Self::constraints(budget, cap),
            clustering: ClusteringParams::new(TestFixtures::features(), None),
        }
    }

    /// Write `contents` to `name` inside `dir`
    pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Exporter that records nothing and must never be called
    pub fn forbidden_exporter() -> MockExportWriter {
        let mut exporter = MockExportWriter::new();
        exporter.expect_write_plan().times(0);
        exporter
    }

    /// Exporter that accepts exactly one plan
    pub fn accepting_exporter() -> MockExportWriter {
        let mut exporter = MockExportWriter::new();
        exporter
            .expect_write_plan()
            .times(1)
            .returning(|plan_id, lines, total_spend| {
                Ok(ExportReceipt {
                    path: PathBuf::from(format!("out/{plan_id}_0.csv")),
                    rows: lines.len(),
                    total_spend,
                })
            });
        exporter
    }
}
