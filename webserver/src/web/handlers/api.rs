//! REST API handlers
//!
//! Each handler forwards one request to the planner and returns its JSON
//! result. A plan that fails the guardrails is a normal 200 response with
//! `ok: false`; only data and configuration faults become error statuses.

use axum::{extract::State, response::Json};
use planner::{CatalogSource, ExportWriter, PipelineRun, PlanStore};
use serde_json::{json, Value};
use shared::{
    component_info, AutoSeedRequest, ClusterRequest, ClusterResponse, ComponentId, ExportRequest, ExportResponse,
    GenerateRequest, GenerateResponse, PublishRequest, PublishResponse, ValidateRequest, ValidateResponse,
};

use crate::error::WebServerResult;
use crate::webserver_impl::WebServer;

/// Liveness and basic server counters - /health
pub async fn health<C, E, P>(State(server): State<WebServer<C, E, P>>) -> Json<Value>
where
    C: CatalogSource + 'static,
    E: ExportWriter + 'static,
    P: PlanStore + 'static,
{
    let state = server.state();
    Json(json!({
        "status": "ok",
        "uptime_seconds": state.uptime_seconds(),
        "requests_served": state.requests_served.load(std::sync::atomic::Ordering::Relaxed),
        "server_time": chrono::Utc::now().timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Cluster stores - /api/seed/cluster
pub async fn cluster<C, E, P>(
    State(server): State<WebServer<C, E, P>>,
    Json(request): Json<ClusterRequest>,
) -> WebServerResult<Json<ClusterResponse>>
where
    C: CatalogSource + 'static,
    E: ExportWriter + 'static,
    P: PlanStore + 'static,
{
    server.state().record_request();
    component_info!(ComponentId::current(), "🌐 Cluster request for {}", request.stores_csv.display());
    Ok(Json(server.planner().cluster(request).await?))
}

/// Draft allocation - /api/seed/generate
pub async fn generate<C, E, P>(
    State(server): State<WebServer<C, E, P>>,
    Json(request): Json<GenerateRequest>,
) -> WebServerResult<Json<GenerateResponse>>
where
    C: CatalogSource + 'static,
    E: ExportWriter + 'static,
    P: PlanStore + 'static,
{
    server.state().record_request();
    component_info!(
        ComponentId::current(),
        "🌐 Generate request: {} stores, budget {}",
        request.cluster_map.len(),
        request.budget
    );
    Ok(Json(server.planner().generate(request).await?))
}

/// Guardrail check - /api/seed/validate
pub async fn validate<C, E, P>(
    State(server): State<WebServer<C, E, P>>,
    Json(request): Json<ValidateRequest>,
) -> WebServerResult<Json<ValidateResponse>>
where
    C: CatalogSource + 'static,
    E: ExportWriter + 'static,
    P: PlanStore + 'static,
{
    server.state().record_request();
    component_info!(ComponentId::current(), "🌐 Validate request: {} lines", request.lines.len());
    Ok(Json(server.planner().validate(request).await?))
}

/// Publish a plan - /api/seed/publish
pub async fn publish<C, E, P>(
    State(server): State<WebServer<C, E, P>>,
    Json(request): Json<PublishRequest>,
) -> WebServerResult<Json<PublishResponse>>
where
    C: CatalogSource + 'static,
    E: ExportWriter + 'static,
    P: PlanStore + 'static,
{
    server.state().record_request();
    component_info!(ComponentId::current(), "🌐 Publish request for '{}'", request.plan_name);
    Ok(Json(server.planner().publish(request).await?))
}

/// Export a published plan - /api/export/erp
pub async fn export<C, E, P>(
    State(server): State<WebServer<C, E, P>>,
    Json(request): Json<ExportRequest>,
) -> WebServerResult<Json<ExportResponse>>
where
    C: CatalogSource + 'static,
    E: ExportWriter + 'static,
    P: PlanStore + 'static,
{
    server.state().record_request();
    component_info!(ComponentId::current(), "🌐 Export request for plan {}", request.plan_id);
    Ok(Json(server.planner().export(request).await?))
}

/// Full pipeline - /api/seed/auto
pub async fn auto_seed<C, E, P>(
    State(server): State<WebServer<C, E, P>>,
    Json(request): Json<AutoSeedRequest>,
) -> WebServerResult<Json<PipelineRun>>
where
    C: CatalogSource + 'static,
    E: ExportWriter + 'static,
    P: PlanStore + 'static,
{
    server.state().record_request();
    component_info!(ComponentId::current(), "🌐 Auto seed request, budget {}", request.budget);
    Ok(Json(server.planner().auto_seed(request).await?))
}
