//! WebServer-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use planner::PlannerError;
use serde_json::json;
use shared::{component_error, component_warn, ComponentId, SharedError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error("Invalid configuration: {0}")]
    Shared(#[from] SharedError),

    #[error("Invalid bind address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid CORS origin '{origin}'")]
    InvalidOrigin { origin: String },

    #[error("Server startup error: {0}")]
    ServerStartup(String),
}

impl WebServerError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebServerError::Planner(err) => match err {
                PlannerError::ConfigurationError { .. }
                | PlannerError::CatalogLoadError { .. }
                | PlannerError::ClusteringError { .. } => StatusCode::BAD_REQUEST,
                PlannerError::LookupError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                PlannerError::PlanNotFound { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            WebServerError::Shared(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            WebServerError::Planner(PlannerError::ConfigurationError { .. }) | WebServerError::Shared(_) => {
                "configuration_error"
            }
            WebServerError::Planner(PlannerError::LookupError { .. }) => "lookup_error",
            WebServerError::Planner(PlannerError::CatalogLoadError { .. }) => "catalog_load_error",
            WebServerError::Planner(PlannerError::ClusteringError { .. }) => "clustering_error",
            WebServerError::Planner(PlannerError::PlanNotFound { .. }) => "not_found",
            _ => "internal_error",
        }
    }
}

impl IntoResponse for WebServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            component_error!(ComponentId::current(), "❌ Request failed: {}", self);
        } else {
            component_warn!(ComponentId::current(), "Request rejected ({}): {}", status, self);
        }

        let body = json!({
            "error": self.kind(),
            "detail": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub type WebServerResult<T> = Result<T, WebServerError>;
