//! Main webserver implementation
//!
//! The WebServer owns the planner behind an `Arc` and hands a clone of
//! itself to every handler as axum state.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use planner::{CatalogSource, ExportWriter, PlanStore, SeedPlanner};
use shared::{component_info, logging, ComponentId};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::error::{WebServerError, WebServerResult};
use crate::state::WebServerState;
use crate::web::handlers::api;

/// Main webserver struct with dependency injection
pub struct WebServer<C, E, P>
where
    C: CatalogSource,
    E: ExportWriter,
    P: PlanStore,
{
    state: Arc<WebServerState>,
    planner: Arc<SeedPlanner<C, E, P>>,
}

impl<C, E, P> Clone for WebServer<C, E, P>
where
    C: CatalogSource,
    E: ExportWriter,
    P: PlanStore,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            planner: Arc::clone(&self.planner),
        }
    }
}

impl<C, E, P> WebServer<C, E, P>
where
    C: CatalogSource + 'static,
    E: ExportWriter + 'static,
    P: PlanStore + 'static,
{
    pub fn new(bind_address: SocketAddr, planner: SeedPlanner<C, E, P>) -> Self {
        let cors = planner.settings().cors_allow_origins.clone();
        Self {
            state: Arc::new(WebServerState::new(bind_address, cors)),
            planner: Arc::new(planner),
        }
    }

    pub fn state(&self) -> &Arc<WebServerState> {
        &self.state
    }

    pub fn planner(&self) -> &SeedPlanner<C, E, P> {
        &self.planner
    }

    /// CORS layer for the configured origins
    pub fn cors_layer(&self) -> WebServerResult<CorsLayer> {
        if self.state.cors_is_permissive() {
            return Ok(CorsLayer::permissive());
        }
        let origins = self
            .state
            .cors_allow_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| WebServerError::InvalidOrigin { origin: origin.clone() })
            })
            .collect::<WebServerResult<Vec<_>>>()?;
        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any))
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> WebServerResult<Router> {
        let router = Router::new()
            // Planning routes
            .route("/api/seed/cluster", post(api::cluster::<C, E, P>))
            .route("/api/seed/generate", post(api::generate::<C, E, P>))
            .route("/api/seed/validate", post(api::validate::<C, E, P>))
            .route("/api/seed/publish", post(api::publish::<C, E, P>))
            .route("/api/seed/auto", post(api::auto_seed::<C, E, P>))
            // Export
            .route("/api/export/erp", post(api::export::<C, E, P>))
            // Health check
            .route("/health", get(api::health::<C, E, P>))
            .layer(ServiceBuilder::new().layer(self.cors_layer()?).into_inner())
            .with_state(self.clone());
        Ok(router)
    }

    /// Serve until Ctrl+C
    pub async fn run(&self) -> WebServerResult<()> {
        let router = self.build_router()?;
        let address = self.state.bind_address;

        let listener = tokio::net::TcpListener::bind(address)
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Failed to bind to {}: {}", address, e)))?;

        component_info!(ComponentId::current(), "🌐 Web server listening on http://{}", address);

        let state = Arc::clone(&self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => logging::log_shutdown(ComponentId::current(), "Received Ctrl+C signal"),
                    Err(err) => logging::log_error(ComponentId::current(), "Signal handling", &err),
                }
                state.set_running(false);
            })
            .await
            .map_err(|e| WebServerError::ServerStartup(e.to_string()))?;

        Ok(())
    }
}
