//! Planning data model shared by the engine and the HTTP shell
//!
//! All values here are plain owned data. A seed plan is handed from the
//! allocator to the validator and on to export by cloning, never by
//! sharing mutable state.

use crate::errors::{SharedError, SharedResult};
use crate::types::{ClusterId, SkuId, StoreId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU32;

/// A store and the numeric features the cluster assigner works on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    #[serde(default)]
    pub features: BTreeMap<String, f64>,
    #[serde(default)]
    pub cluster_id: Option<ClusterId>,
}

impl Store {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: StoreId::new(id),
            features: BTreeMap::new(),
            cluster_id: None,
        }
    }

    pub fn with_feature(mut self, name: &str, value: f64) -> Self {
        self.features.insert(name.to_string(), value);
        self
    }

    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }
}

/// A catalog entry
///
/// `priority` ranks SKUs for allocation, higher first. Entries with equal
/// priority keep their catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sku {
    pub id: SkuId,
    pub price: f64,
    #[serde(default)]
    pub priority: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Sku {
    pub fn new(id: impl Into<String>, price: f64) -> Self {
        Self {
            id: SkuId::new(id),
            price,
            priority: 0.0,
            category: None,
        }
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Store to cluster assignment, iterated in ascending store id order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterMap(BTreeMap<StoreId, ClusterId>);

impl ClusterMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, store: StoreId, cluster: ClusterId) -> Option<ClusterId> {
        self.0.insert(store, cluster)
    }

    pub fn get(&self, store: &StoreId) -> Option<ClusterId> {
        self.0.get(store).copied()
    }

    pub fn contains(&self, store: &StoreId) -> bool {
        self.0.contains_key(store)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StoreId, ClusterId)> {
        self.0.iter().map(|(store, cluster)| (store, *cluster))
    }

    /// Number of distinct clusters referenced by the map
    pub fn cluster_count(&self) -> usize {
        self.0.values().collect::<BTreeSet<_>>().len()
    }
}

impl FromIterator<(StoreId, ClusterId)> for ClusterMap {
    fn from_iter<I: IntoIterator<Item = (StoreId, ClusterId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, u32)> for ClusterMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, u32)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(store, cluster)| (StoreId::new(store), ClusterId(cluster)))
                .collect(),
        )
    }
}

/// One allocated (SKU, store, quantity) line; quantity is always positive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub sku_id: SkuId,
    pub store_id: StoreId,
    pub quantity: NonZeroU32,
}

impl AllocationLine {
    pub fn new(sku_id: impl Into<String>, store_id: impl Into<String>, quantity: u32) -> SharedResult<Self> {
        let quantity = NonZeroU32::new(quantity).ok_or_else(|| SharedError::InvalidLine {
            reason: "quantity must be positive".to_string(),
        })?;
        Ok(Self {
            sku_id: SkuId::new(sku_id),
            store_id: StoreId::new(store_id),
            quantity,
        })
    }
}

#[derive(Deserialize)]
struct RawConstraints {
    budget: f64,
    max_skus_per_store: i64,
}

/// The two guardrails every plan is checked against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConstraints")]
pub struct Constraints {
    budget: f64,
    max_skus_per_store: u32,
}

impl Constraints {
    /// Build validated constraints; negative or non-finite caps are rejected
    pub fn new(budget: f64, max_skus_per_store: i64) -> SharedResult<Self> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(SharedError::invalid_config("budget", budget));
        }
        let max_skus_per_store = u32::try_from(max_skus_per_store)
            .map_err(|_| SharedError::invalid_config("max_skus_per_store", max_skus_per_store))?;
        Ok(Self {
            budget,
            max_skus_per_store,
        })
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn max_skus_per_store(&self) -> u32 {
        self.max_skus_per_store
    }
}

impl TryFrom<RawConstraints> for Constraints {
    type Error = SharedError;

    fn try_from(raw: RawConstraints) -> SharedResult<Self> {
        Constraints::new(raw.budget, raw.max_skus_per_store)
    }
}

/// Output of one allocator run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedPlan {
    pub lines: Vec<AllocationLine>,
    pub total_spend: f64,
    pub budget_left: f64,
}

impl SeedPlan {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Distinct SKU count per store, in ascending store order
    pub fn distinct_skus_per_store(&self) -> BTreeMap<StoreId, usize> {
        distinct_skus_per_store(&self.lines)
    }
}

/// Distinct SKU count per store for any set of lines
pub fn distinct_skus_per_store(lines: &[AllocationLine]) -> BTreeMap<StoreId, usize> {
    let mut per_store: BTreeMap<StoreId, BTreeSet<&SkuId>> = BTreeMap::new();
    for line in lines {
        per_store
            .entry(line.store_id.clone())
            .or_default()
            .insert(&line.sku_id);
    }
    per_store
        .into_iter()
        .map(|(store, skus)| (store, skus.len()))
        .collect()
}
