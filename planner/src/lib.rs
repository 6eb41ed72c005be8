//! Seed assortment planner
//!
//! Clusters stores, allocates a budget- and cap-respecting draft assortment
//! across them, checks any set of allocation lines against the same
//! guardrails, and exports plans that pass. The engine in `core` is pure;
//! catalogs, exports and published plans go through the traits in `traits`.

pub mod core;
pub mod error;
pub mod planner;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use core::{
    ClusterAssignment, ClusteringParams, GuardrailValidator, KMeansAssigner, PipelineInput, PipelineRun,
    PipelineStage, SeedAllocator, SeedPipeline, StaticAssigner,
};
pub use error::{LookupTarget, PlannerError, PlannerResult};
pub use planner::SeedPlanner;
pub use services::{CsvCatalog, CsvExportWriter, JsonPlanStore};
pub use traits::{CatalogSource, ClusterAssigner, ExportReceipt, ExportWriter, PlanStore, StoredPlan};
