//! One-shot seed pipeline: cluster, allocate, validate, export
//!
//! The run carries an explicit stage tag. Validation is the only fork:
//! a clean report continues to export, any violation ends the run in
//! `ValidatedFailed` with the report as its result.

use serde::{Deserialize, Serialize};
use shared::{
    component_info, component_warn, ClusterMap, ComponentId, Constraints, SeedPlan, Sku, Store, ViolationReport,
};

use super::allocator::SeedAllocator;
use super::clustering::{ClusterAssignment, ClusteringParams};
use super::validator::GuardrailValidator;
use crate::error::{PlannerError, PlannerResult};
use crate::traits::{ClusterAssigner, ExportReceipt, ExportWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Clustered,
    Allocated,
    ValidatedOk,
    ValidatedFailed,
    Exported,
}

impl PipelineStage {
    /// Whether `next` directly follows this stage
    pub fn can_advance_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (self, next),
            (Clustered, Allocated) | (Allocated, ValidatedOk) | (Allocated, ValidatedFailed) | (ValidatedOk, Exported)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::ValidatedFailed | PipelineStage::Exported)
    }

    /// Stage reached after validating with `report`
    pub fn after_validation(report: &ViolationReport) -> Self {
        if report.is_ok() {
            PipelineStage::ValidatedOk
        } else {
            PipelineStage::ValidatedFailed
        }
    }
}

/// Everything one pipeline run needs
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub plan_id: String,
    pub stores: Vec<Store>,
    pub catalog: Vec<Sku>,
    pub constraints: Constraints,
    pub clustering: ClusteringParams,
}

/// State and results of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRun {
    pub stage: PipelineStage,
    pub history: Vec<PipelineStage>,
    pub cluster_map: ClusterMap,
    pub k: usize,
    pub silhouette: Option<f64>,
    pub plan: Option<SeedPlan>,
    pub report: Option<ViolationReport>,
    pub export: Option<ExportReceipt>,
}

impl PipelineRun {
    /// A run that has just finished clustering
    pub fn clustered(assignment: ClusterAssignment) -> Self {
        Self {
            stage: PipelineStage::Clustered,
            history: vec![PipelineStage::Clustered],
            cluster_map: assignment.cluster_map,
            k: assignment.k,
            silhouette: assignment.silhouette,
            plan: None,
            report: None,
            export: None,
        }
    }

    /// Move to `next`, rejecting anything but the fixed sequence
    pub fn advance(&mut self, next: PipelineStage) -> PlannerResult<()> {
        if !self.stage.can_advance_to(next) {
            return Err(PlannerError::InvalidTransition { from: self.stage, to: next });
        }
        self.stage = next;
        self.history.push(next);
        Ok(())
    }

    pub fn record_plan(&mut self, plan: SeedPlan) -> PlannerResult<()> {
        self.advance(PipelineStage::Allocated)?;
        self.plan = Some(plan);
        Ok(())
    }

    pub fn record_report(&mut self, report: ViolationReport) -> PlannerResult<()> {
        self.advance(PipelineStage::after_validation(&report))?;
        self.report = Some(report);
        Ok(())
    }

    pub fn record_export(&mut self, receipt: ExportReceipt) -> PlannerResult<()> {
        self.advance(PipelineStage::Exported)?;
        self.export = Some(receipt);
        Ok(())
    }

    pub fn is_exported(&self) -> bool {
        self.stage == PipelineStage::Exported
    }
}

/// Runs the fixed four-stage sequence with injected collaborators
pub struct SeedPipeline<A, E>
where
    A: ClusterAssigner,
    E: ExportWriter,
{
    assigner: A,
    allocator: SeedAllocator,
    exporter: E,
}

impl<A, E> SeedPipeline<A, E>
where
    A: ClusterAssigner,
    E: ExportWriter,
{
    pub fn new(assigner: A, allocator: SeedAllocator, exporter: E) -> Self {
        Self {
            assigner,
            allocator,
            exporter,
        }
    }

    /// Run the pipeline once
    ///
    /// Configuration and lookup errors abort with no partial output. A
    /// guardrail failure is a successful run that ends in
    /// `ValidatedFailed` without exporting.
    pub async fn run(&self, input: PipelineInput) -> PlannerResult<PipelineRun> {
        let component = ComponentId::current();

        let assignment = self.assigner.assign(&input.stores, &input.clustering)?;
        let mut run = PipelineRun::clustered(assignment);
        component_info!(component, "📋 Clustered {} stores into {} clusters", run.cluster_map.len(), run.k);

        let plan = self
            .allocator
            .allocate(&input.catalog, &run.cluster_map, &input.constraints)?;
        component_info!(
            component,
            "📋 Allocated {} lines, spend {:.2}, budget left {:.2}",
            plan.lines.len(),
            plan.total_spend,
            plan.budget_left
        );

        let report = GuardrailValidator::new(&input.catalog)?
            .with_store_scope(&run.cluster_map)
            .validate(&plan.lines, &input.constraints)?;
        run.record_plan(plan)?;
        run.record_report(report)?;

        if run.stage == PipelineStage::ValidatedFailed {
            let count = run.report.as_ref().map(ViolationReport::len).unwrap_or(0);
            component_warn!(component, "Plan '{}' failed validation with {} violations", input.plan_id, count);
            return Ok(run);
        }

        let (lines, total_spend) = match &run.plan {
            Some(plan) => (plan.lines.as_slice(), plan.total_spend),
            None => (&[][..], 0.0),
        };
        let receipt = self.exporter.write_plan(&input.plan_id, lines, total_spend).await?;
        component_info!(component, "✅ Exported {} rows to {}", receipt.rows, receipt.path.display());
        run.record_export(receipt)?;

        Ok(run)
    }
}
