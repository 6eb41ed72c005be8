//! Shared types for the seed assortment planner
//!
//! Contains the planning data model, guardrail violation records, the
//! request/response messages, settings and logging helpers used by both
//! the planner and the webserver.

pub mod config;
pub mod errors;
pub mod logging;
pub mod messages;
pub mod model;
pub mod types;
pub mod violations;

pub use config::Settings;
pub use errors::*;
pub use model::*;
pub use types::*;
pub use violations::*;

pub use messages::{
    // Clustering and generation
    ClusterRequest, ClusterResponse, ClusterStats, StoreCluster,
    GenerateRequest, GenerateResponse,

    // Validation
    ValidateRequest, ValidateResponse,

    // Full pipeline
    AutoSeedRequest,

    // Publishing and export
    PublishRequest, PublishResponse, PlanStatus,
    ExportRequest, ExportResponse, ExportFormat,
};
