//! Request-level planner operations
//!
//! `SeedPlanner` turns wire requests into engine calls: it loads catalogs
//! through a `CatalogSource`, runs the allocator, validator and pipeline,
//! and hands accepted or published plans to the export and plan stores.
//! Both the CLI and the HTTP shell go through it.

use std::sync::Arc;

use shared::{
    component_info, AutoSeedRequest, ClusterRequest, ClusterResponse, ComponentId, Constraints, ExportRequest,
    ExportResponse, GenerateRequest, GenerateResponse, PublishRequest, PublishResponse, Settings, Sku, Store,
    ValidateRequest, ValidateResponse,
};

use crate::core::{
    ClusteringParams, GuardrailValidator, KMeansAssigner, PipelineInput, PipelineRun, SeedAllocator, SeedPipeline,
    StaticAssigner,
};
use crate::error::{PlannerError, PlannerResult};
use crate::traits::{CatalogSource, ClusterAssigner, ExportWriter, PlanStore};

/// Label used for artifacts written by the one-shot pipeline
pub const AUTO_PLAN_ID: &str = "seed_auto";

pub struct SeedPlanner<C, E, P>
where
    C: CatalogSource,
    E: ExportWriter,
    P: PlanStore,
{
    settings: Settings,
    allocator: SeedAllocator,
    assigner: KMeansAssigner,

    // Injected dependencies (mockable for testing)
    catalog: C,
    exporter: Arc<E>,
    plans: P,
}

impl<C, E, P> SeedPlanner<C, E, P>
where
    C: CatalogSource,
    E: ExportWriter,
    P: PlanStore,
{
    /// Create a planner; fails if the configured baseline quantity is zero
    pub fn new(settings: Settings, catalog: C, exporter: E, plans: P) -> PlannerResult<Self> {
        let quantity = std::num::NonZeroU32::new(settings.baseline_quantity)
            .ok_or_else(|| PlannerError::config("baseline_quantity", "must be at least 1"))?;
        Ok(Self {
            settings,
            allocator: SeedAllocator::with_baseline_quantity(quantity),
            assigner: KMeansAssigner::new(),
            catalog,
            exporter: Arc::new(exporter),
            plans,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build validated constraints, falling back to the configured SKU cap
    pub fn constraints(&self, budget: f64, max_skus_per_store: Option<i64>) -> PlannerResult<Constraints> {
        let cap = max_skus_per_store.unwrap_or(i64::from(self.settings.default_max_skus_per_store));
        Ok(Constraints::new(budget, cap)?)
    }

    fn features(&self, requested: Option<Vec<String>>) -> Vec<String> {
        match requested {
            Some(features) if !features.is_empty() => features,
            _ => self.settings.default_features.clone(),
        }
    }

    /// Cluster the stores of a stores CSV
    pub async fn cluster(&self, request: ClusterRequest) -> PlannerResult<ClusterResponse> {
        let features = self.features(request.features);
        let stores = self.catalog.load_stores(&request.stores_csv, &features).await?;
        let assignment = self.assigner.assign(&stores, &ClusteringParams::new(features, request.k))?;

        component_info!(
            ComponentId::current(),
            "📋 Clustered {} stores into {} clusters",
            assignment.cluster_map.len(),
            assignment.k
        );
        Ok(assignment.to_response())
    }

    /// Generate a draft plan without validating or exporting it
    pub async fn generate(&self, request: GenerateRequest) -> PlannerResult<GenerateResponse> {
        let constraints = self.constraints(request.budget, request.max_skus_per_store)?;
        let catalog = self.catalog.load_skus(&request.skus_csv).await?;
        let plan = self.allocator.allocate(&catalog, &request.cluster_map, &constraints)?;
        Ok(plan.into())
    }

    /// Check any set of lines against the guardrails
    pub async fn validate(&self, request: ValidateRequest) -> PlannerResult<ValidateResponse> {
        let constraints = self.constraints(request.budget, request.max_skus_per_store)?;
        let catalog = self.catalog.load_skus(&request.skus_csv).await?;

        let mut validator = GuardrailValidator::new(&catalog)?;
        if let Some(map) = &request.cluster_map {
            validator = validator.with_store_scope(map);
        }
        let report = validator.validate(&request.lines, &constraints)?;
        Ok(report.into())
    }

    /// Cluster, allocate, validate and export in one pass
    ///
    /// A supplied cluster map replaces k-means. Without a stores CSV the
    /// map's own stores are used.
    pub async fn auto_seed(&self, request: AutoSeedRequest) -> PlannerResult<PipelineRun> {
        let constraints = self.constraints(request.budget, request.max_skus_per_store)?;
        let features = self.features(request.features);
        let catalog = self.catalog.load_skus(&request.skus_csv).await?;

        let exporter = Arc::clone(&self.exporter);
        let params = ClusteringParams::new(features.clone(), request.k);

        match request.cluster_map {
            Some(map) => {
                let stores = match &request.stores_csv {
                    Some(path) => self.catalog.load_stores(path, &features).await?,
                    None => map.iter().map(|(id, _)| Store::new(id.as_str())).collect(),
                };
                let pipeline = SeedPipeline::new(StaticAssigner::new(map), self.allocator.clone(), exporter);
                pipeline.run(self.pipeline_input(stores, catalog, constraints, params)).await
            }
            None => {
                let stores_csv = request
                    .stores_csv
                    .unwrap_or_else(|| self.settings.default_stores_csv.clone());
                let stores = self.catalog.load_stores(&stores_csv, &features).await?;
                let pipeline = SeedPipeline::new(self.assigner.clone(), self.allocator.clone(), exporter);
                pipeline.run(self.pipeline_input(stores, catalog, constraints, params)).await
            }
        }
    }

    fn pipeline_input(
        &self,
        stores: Vec<Store>,
        catalog: Vec<Sku>,
        constraints: Constraints,
        clustering: ClusteringParams,
    ) -> PipelineInput {
        PipelineInput {
            plan_id: AUTO_PLAN_ID.to_string(),
            stores,
            catalog,
            constraints,
            clustering,
        }
    }

    /// Publish a plan under a name
    pub async fn publish(&self, request: PublishRequest) -> PlannerResult<PublishResponse> {
        self.plans.publish(request).await
    }

    /// Export a previously published plan
    pub async fn export(&self, request: ExportRequest) -> PlannerResult<ExportResponse> {
        let plan = self
            .plans
            .get(&request.plan_id)
            .await?
            .ok_or_else(|| PlannerError::PlanNotFound {
                plan_id: request.plan_id.to_string(),
            })?;

        let receipt = self
            .exporter
            .write_plan(&plan.plan_id.to_string(), &plan.lines, plan.total_spend.unwrap_or(0.0))
            .await?;
        Ok(ExportResponse {
            path: receipt.path,
            rows: receipt.rows,
        })
    }
}
