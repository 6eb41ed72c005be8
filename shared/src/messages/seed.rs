//! Clustering, generation and validation messages

use crate::model::{AllocationLine, ClusterMap, SeedPlan};
use crate::types::{ClusterId, StoreId};
use crate::violations::{Violation, ViolationReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Cluster the stores in a stores CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRequest {
    pub stores_csv: PathBuf,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    /// Explicit cluster count; best k by silhouette when absent
    #[serde(default)]
    pub k: Option<usize>,
    /// Informational only
    #[serde(default)]
    pub period: Option<String>,
}

/// One store's cluster assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreCluster {
    pub store_id: StoreId,
    pub cluster_id: ClusterId,
}

/// Per-cluster summary statistics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterStats {
    pub store_count: usize,
    pub feature_means: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResponse {
    pub clusters: Vec<StoreCluster>,
    pub silhouette: Option<f64>,
    pub k: usize,
    pub cluster_stats: BTreeMap<ClusterId, ClusterStats>,
}

/// Generate a draft plan from a SKU catalog and a cluster map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub skus_csv: PathBuf,
    pub cluster_map: ClusterMap,
    pub budget: f64,
    #[serde(default)]
    pub max_skus_per_store: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub lines: Vec<AllocationLine>,
    pub total_spend: f64,
    pub budget_left: f64,
}

impl From<SeedPlan> for GenerateResponse {
    fn from(plan: SeedPlan) -> Self {
        Self {
            lines: plan.lines,
            total_spend: plan.total_spend,
            budget_left: plan.budget_left,
        }
    }
}

/// Validate any set of lines (draft or hand-edited) against the guardrails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub lines: Vec<AllocationLine>,
    pub skus_csv: PathBuf,
    pub budget: f64,
    #[serde(default)]
    pub max_skus_per_store: Option<i64>,
    /// When given, lines must only reference stores in this map
    #[serde(default)]
    pub cluster_map: Option<ClusterMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub violations: Vec<Violation>,
    pub suggestions: Vec<String>,
    pub ok: bool,
}

impl From<ViolationReport> for ValidateResponse {
    fn from(report: ViolationReport) -> Self {
        Self {
            ok: report.is_ok(),
            suggestions: report.suggestions(),
            violations: report.violations,
        }
    }
}

/// Run cluster, generate, validate and export in one call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSeedRequest {
    pub skus_csv: PathBuf,
    #[serde(default)]
    pub stores_csv: Option<PathBuf>,
    pub budget: f64,
    #[serde(default)]
    pub max_skus_per_store: Option<i64>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub k: Option<usize>,
    /// Pre-defined clusters; skips k-means when present
    #[serde(default)]
    pub cluster_map: Option<ClusterMap>,
}
