//! Greedy seed allocation
//!
//! Stores are visited in ascending id order. Each store walks the catalog
//! in priority order and takes a baseline quantity of every SKU that still
//! fits both the per-store distinct-SKU cap and the remaining budget. A SKU
//! that does not fit is skipped for that store only.
//!
//! There is no backtracking: an expensive, highly ranked SKU taken early can
//! leave budget unspent that cheaper SKUs would have used. That is accepted
//! for a draft plan.

use std::collections::HashSet;
use std::num::NonZeroU32;

use shared::{component_debug, AllocationLine, ClusterMap, ComponentId, Constraints, SeedPlan, Sku, SkuId};

use crate::error::{PlannerError, PlannerResult};

/// Cost of `quantity` units; the validator uses the same formula
pub(crate) fn line_cost(price: f64, quantity: NonZeroU32) -> f64 {
    price * f64::from(quantity.get())
}

/// Reject catalogs the allocator cannot rank
pub fn check_catalog(catalog: &[Sku]) -> PlannerResult<()> {
    if catalog.is_empty() {
        return Err(PlannerError::config("catalog", "SKU catalog is empty"));
    }
    check_entries(catalog)
}

/// Unique ids, finite non-negative prices and finite priorities
///
/// An empty catalog passes; only allocation needs at least one SKU.
pub fn check_entries(catalog: &[Sku]) -> PlannerResult<()> {
    let mut seen: HashSet<&SkuId> = HashSet::with_capacity(catalog.len());
    for sku in catalog {
        if !seen.insert(&sku.id) {
            return Err(PlannerError::config("catalog", format!("duplicate SKU id '{}'", sku.id)));
        }
        if !sku.price.is_finite() || sku.price < 0.0 {
            return Err(PlannerError::config(
                "catalog",
                format!("SKU '{}' has invalid price {}", sku.id, sku.price),
            ));
        }
        if !sku.priority.is_finite() {
            return Err(PlannerError::config(
                "catalog",
                format!("SKU '{}' has invalid priority {}", sku.id, sku.priority),
            ));
        }
    }
    Ok(())
}

/// SKUs in allocation order: priority descending, catalog order on ties
pub fn rank_catalog(catalog: &[Sku]) -> Vec<&Sku> {
    let mut ranked: Vec<&Sku> = catalog.iter().collect();
    // sort_by is stable, so equal priorities keep catalog order
    ranked.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    ranked
}

/// Builds a cap-respecting draft plan
#[derive(Debug, Clone)]
pub struct SeedAllocator {
    baseline_quantity: NonZeroU32,
}

impl SeedAllocator {
    /// Allocator that places one unit per (SKU, store)
    pub fn new() -> Self {
        Self {
            baseline_quantity: NonZeroU32::MIN,
        }
    }

    pub fn with_baseline_quantity(baseline_quantity: NonZeroU32) -> Self {
        Self { baseline_quantity }
    }

    pub fn baseline_quantity(&self) -> NonZeroU32 {
        self.baseline_quantity
    }

    /// Allocate the catalog across the stores in `cluster_map`
    ///
    /// Fails with a configuration error on an empty catalog, an empty cluster
    /// map or an invalid SKU. An empty plan is a valid result when nothing
    /// fits.
    pub fn allocate(
        &self,
        catalog: &[Sku],
        cluster_map: &ClusterMap,
        constraints: &Constraints,
    ) -> PlannerResult<SeedPlan> {
        check_catalog(catalog)?;
        if cluster_map.is_empty() {
            return Err(PlannerError::config("cluster_map", "cluster map is empty"));
        }

        let budget = constraints.budget();
        let cap = constraints.max_skus_per_store() as usize;
        let quantity = self.baseline_quantity;

        if budget == 0.0 || cap == 0 {
            component_debug!(
                ComponentId::current(),
                "Nothing to allocate: budget={}, max_skus_per_store={}",
                budget,
                cap
            );
            return Ok(SeedPlan {
                lines: Vec::new(),
                total_spend: 0.0,
                budget_left: budget,
            });
        }

        let ranked = rank_catalog(catalog);
        let cheapest = ranked
            .iter()
            .map(|sku| line_cost(sku.price, quantity))
            .fold(f64::INFINITY, f64::min);

        let mut lines = Vec::new();
        let mut spend = 0.0_f64;

        for (store_id, cluster_id) in cluster_map.iter() {
            if spend + cheapest > budget {
                component_debug!(
                    ComponentId::current(),
                    "Budget exhausted at store {} (spend {:.2} of {:.2})",
                    store_id,
                    spend,
                    budget
                );
                break;
            }

            let mut assigned: HashSet<&SkuId> = HashSet::new();
            for sku in &ranked {
                if assigned.len() >= cap {
                    break;
                }
                if assigned.contains(&sku.id) {
                    continue;
                }
                let cost = line_cost(sku.price, quantity);
                if spend + cost > budget {
                    continue;
                }
                spend += cost;
                assigned.insert(&sku.id);
                lines.push(AllocationLine {
                    sku_id: sku.id.clone(),
                    store_id: store_id.clone(),
                    quantity,
                });
            }

            component_debug!(
                ComponentId::current(),
                "Store {} (cluster {}) received {} SKUs",
                store_id,
                cluster_id,
                assigned.len()
            );
        }

        Ok(SeedPlan {
            lines,
            total_spend: spend,
            budget_left: budget - spend,
        })
    }
}

impl Default for SeedAllocator {
    fn default() -> Self {
        Self::new()
    }
}
