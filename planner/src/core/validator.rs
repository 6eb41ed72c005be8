//! Guardrail validation
//!
//! Recomputes spend and per-store distinct SKU counts for any set of lines
//! and reports every cap breach. Unknown ids are data-integrity faults and
//! surface as `LookupError`, never as violations.

use std::collections::{BTreeMap, HashMap, HashSet};

use shared::{
    component_debug, AllocationLine, ClusterMap, ComponentId, Constraints, Sku, SkuId, StoreId, Violation,
    ViolationReport,
};

use super::allocator::{check_entries, line_cost};
use crate::error::{PlannerError, PlannerResult};

/// Price lookup over a SKU catalog
pub struct GuardrailValidator<'a> {
    prices: HashMap<&'a SkuId, f64>,
    store_scope: Option<&'a ClusterMap>,
}

impl<'a> GuardrailValidator<'a> {
    /// Fails with a configuration error on duplicate ids or bad prices
    pub fn new(catalog: &'a [Sku]) -> PlannerResult<Self> {
        check_entries(catalog)?;
        Ok(Self {
            prices: catalog.iter().map(|sku| (&sku.id, sku.price)).collect(),
            store_scope: None,
        })
    }

    /// Also require every line's store to be present in `cluster_map`
    pub fn with_store_scope(mut self, cluster_map: &'a ClusterMap) -> Self {
        self.store_scope = Some(cluster_map);
        self
    }

    /// Validate `lines` against `constraints`
    ///
    /// Violations come back budget first, then stores in ascending id order.
    pub fn validate(&self, lines: &[AllocationLine], constraints: &Constraints) -> PlannerResult<ViolationReport> {
        let mut total = 0.0_f64;
        let mut per_store: BTreeMap<&StoreId, HashSet<&SkuId>> = BTreeMap::new();

        for line in lines {
            let price = self
                .prices
                .get(&line.sku_id)
                .copied()
                .ok_or_else(|| PlannerError::unknown_sku(&line.sku_id))?;
            if let Some(scope) = self.store_scope {
                if !scope.contains(&line.store_id) {
                    return Err(PlannerError::unknown_store(&line.store_id));
                }
            }

            total += line_cost(price, line.quantity);
            per_store.entry(&line.store_id).or_default().insert(&line.sku_id);
        }

        let mut report = ViolationReport::new();

        let budget = constraints.budget();
        if total > budget {
            report.push(Violation::budget_exceeded(total, budget));
        }

        let cap = constraints.max_skus_per_store();
        for (store, skus) in per_store {
            if skus.len() > cap as usize {
                report.push(Violation::sku_cap_exceeded(store.clone(), skus.len(), cap));
            }
        }

        component_debug!(
            ComponentId::current(),
            "Validated {} lines: spend {:.2} of {:.2}, {} violations",
            lines.len(),
            total,
            budget,
            report.len()
        );

        Ok(report)
    }
}

/// Validate lines against a catalog without store scoping
pub fn validate(lines: &[AllocationLine], catalog: &[Sku], constraints: &Constraints) -> PlannerResult<ViolationReport> {
    GuardrailValidator::new(catalog)?.validate(lines, constraints)
}
