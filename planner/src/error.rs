//! Planner-specific error types
//!
//! `ConfigurationError` and `LookupError` are the two data-integrity faults
//! the engine raises. Guardrail breaches are not errors; they come back as
//! a `ViolationReport`.

use shared::{SharedError, SkuId, StoreId};
use thiserror::Error;

use crate::core::pipeline::PipelineStage;

/// Kind of identifier a lookup failed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTarget {
    Sku(SkuId),
    Store(StoreId),
}

impl std::fmt::Display for LookupTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupTarget::Sku(id) => write!(f, "SKU '{id}'"),
            LookupTarget::Store(id) => write!(f, "store '{id}'"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Configuration error: {field}: {reason}")]
    ConfigurationError { field: String, reason: String },

    #[error("Lookup error: {target} is not in the {source_name}")]
    LookupError { target: LookupTarget, source_name: &'static str },

    #[error("Catalog load failed for {path}: {message}")]
    CatalogLoadError { path: String, message: String },

    #[error("Clustering failed: {reason}")]
    ClusteringError { reason: String },

    #[error("Export failed to {path}: {message}")]
    ExportError { path: String, message: String },

    #[error("Plan not found: {plan_id}")]
    PlanNotFound { plan_id: String },

    #[error("Plan store error: {message}")]
    PlanStoreError { message: String },

    #[error("Pipeline cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: PipelineStage, to: PipelineStage },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PlannerError {
    pub fn config(field: &str, reason: impl Into<String>) -> Self {
        PlannerError::ConfigurationError {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unknown_sku(id: &SkuId) -> Self {
        PlannerError::LookupError {
            target: LookupTarget::Sku(id.clone()),
            source_name: "SKU catalog",
        }
    }

    pub fn unknown_store(id: &StoreId) -> Self {
        PlannerError::LookupError {
            target: LookupTarget::Store(id.clone()),
            source_name: "cluster map",
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, PlannerError::ConfigurationError { .. })
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, PlannerError::LookupError { .. })
    }
}

impl From<SharedError> for PlannerError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::InvalidConfig { field, value } => PlannerError::ConfigurationError {
                reason: format!("invalid value {value}"),
                field,
            },
            SharedError::InvalidLine { reason } => PlannerError::config("lines", reason),
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_config_errors_become_configuration_errors() {
        let err: PlannerError = SharedError::invalid_config("budget", -1.0).into();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "Configuration error: budget: invalid value -1");
    }

    #[test]
    fn test_lookup_error_names_the_missing_id() {
        let err = PlannerError::unknown_sku(&SkuId::from("SKU_X"));
        assert!(err.is_lookup());
        assert_eq!(err.to_string(), "Lookup error: SKU 'SKU_X' is not in the SKU catalog");
    }
}
