//! JSON-file plan store
//!
//! All published plans live in one `plans.json` document keyed by plan id.
//! Publishing the same name again creates a new plan with the next version.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use shared::{component_info, ComponentId, PlanId, PlanStatus, PublishRequest, PublishResponse};
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::{PlannerError, PlannerResult};
use crate::traits::{PlanStore, StoredPlan};

type PlanIndex = BTreeMap<String, StoredPlan>;

pub struct JsonPlanStore {
    path: PathBuf,
    // serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl JsonPlanStore {
    /// Store backed by `{out_dir}/plans.json`
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        Self::with_path(out_dir.as_ref().join("plans.json"))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path, lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_index(&self) -> PlannerResult<PlanIndex> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(PlanIndex::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| PlannerError::PlanStoreError {
                message: format!("{} is not a valid plan index: {e}", self.path.display()),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PlanIndex::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_index(&self, index: &PlanIndex) -> PlannerResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(index)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl PlanStore for JsonPlanStore {
    async fn publish(&self, request: PublishRequest) -> PlannerResult<PublishResponse> {
        let name = request.plan_name.as_str();
        if name.trim().is_empty() {
            return Err(PlannerError::config("plan_name", "plan name is empty"));
        }

        let _guard = self.lock.lock().await;
        let mut index = self.read_index().await?;

        let version = 1 + index.values().filter(|p| p.name == name).count() as u32;
        let plan = StoredPlan {
            plan_id: PlanId::new(),
            name: name.to_string(),
            version,
            status: PlanStatus::Published,
            lines: request.lines,
            total_spend: request.total_spend,
            published_at: Utc::now(),
        };
        let response = PublishResponse {
            plan_id: plan.plan_id.clone(),
            version,
            status: plan.status,
        };

        index.insert(plan.plan_id.to_string(), plan);
        self.write_index(&index).await?;

        component_info!(
            ComponentId::current(),
            "📝 Published plan '{}' v{} as {}",
            name,
            version,
            response.plan_id
        );
        Ok(response)
    }

    async fn get(&self, plan_id: &PlanId) -> PlannerResult<Option<StoredPlan>> {
        let _guard = self.lock.lock().await;
        let mut index = self.read_index().await?;
        Ok(index.remove(&plan_id.to_string()))
    }
}
