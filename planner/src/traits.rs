//! Trait definitions with mockall annotations for testing
//!
//! These are the seams between the planning engine and the outside world:
//! where stores get their clusters, where catalogs come from, where accepted
//! plans are written and where published plans are kept.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{AllocationLine, PlanId, PlanStatus, PublishRequest, PublishResponse, Sku, Store};

use crate::core::clustering::{ClusterAssignment, ClusteringParams};
use crate::error::PlannerResult;

/// Where an exported plan ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub rows: usize,
    pub total_spend: f64,
}

/// A plan as kept by a plan store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPlan {
    pub plan_id: PlanId,
    pub name: String,
    pub version: u32,
    pub status: PlanStatus,
    pub lines: Vec<AllocationLine>,
    #[serde(default)]
    pub total_spend: Option<f64>,
    pub published_at: DateTime<Utc>,
}

/// Store clustering abstraction
///
/// Implementations must return a map that covers every input store.
#[mockall::automock]
pub trait ClusterAssigner: Send + Sync {
    /// Assign every store to a cluster
    ///
    /// # Parameters
    /// - `stores`: Stores with their numeric features
    /// - `params`: Feature selection and optional cluster count
    fn assign(&self, stores: &[Store], params: &ClusteringParams) -> PlannerResult<ClusterAssignment>;
}

/// Catalog loading abstraction for stores and SKUs
#[mockall::automock]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load the SKU catalog, preserving file order
    async fn load_skus(&self, path: &Path) -> PlannerResult<Vec<Sku>>;

    /// Load stores with the named numeric features
    async fn load_stores(&self, path: &Path, features: &[String]) -> PlannerResult<Vec<Store>>;
}

/// Export abstraction for accepted plans
#[mockall::automock]
#[async_trait::async_trait]
pub trait ExportWriter: Send + Sync {
    /// Write the accepted lines as a flat artifact
    ///
    /// # Parameters
    /// - `plan_id`: Label used in the artifact name
    /// - `lines`: Lines that passed validation
    /// - `total_spend`: Spend computed for those lines
    async fn write_plan(
        &self,
        plan_id: &str,
        lines: &[AllocationLine],
        total_spend: f64,
    ) -> PlannerResult<ExportReceipt>;
}

#[async_trait::async_trait]
impl<T: ExportWriter + ?Sized> ExportWriter for std::sync::Arc<T> {
    async fn write_plan(
        &self,
        plan_id: &str,
        lines: &[AllocationLine],
        total_spend: f64,
    ) -> PlannerResult<ExportReceipt> {
        (**self).write_plan(plan_id, lines, total_spend).await
    }
}

/// Persistence abstraction for published plans
#[mockall::automock]
#[async_trait::async_trait]
pub trait PlanStore: Send + Sync {
    /// Publish a plan; repeated names get increasing versions
    async fn publish(&self, request: PublishRequest) -> PlannerResult<PublishResponse>;

    /// Fetch a published plan
    async fn get(&self, plan_id: &PlanId) -> PlannerResult<Option<StoredPlan>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_trait_instantiation() {
        let _assigner = MockClusterAssigner::new();
        let _catalog = MockCatalogSource::new();
        let _exporter = MockExportWriter::new();
        let _plans = MockPlanStore::new();
    }
}
