//! Guardrail violation records
//!
//! A violation is a normal validation result, not an error. The report is
//! what callers show to a planner when a draft cannot be exported.

use crate::types::StoreId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    BudgetExceeded,
    SkuCapExceeded,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::BudgetExceeded => write!(f, "budget_exceeded"),
            ViolationKind::SkuCapExceeded => write!(f, "sku_cap_exceeded"),
        }
    }
}

/// What a violation applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "store_id", rename_all = "snake_case")]
pub enum ViolationScope {
    Global,
    Store(StoreId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub scope: ViolationScope,
    pub observed: f64,
    pub limit: f64,
    pub overage: f64,
    pub message: String,
    pub suggestion: String,
}

impl Violation {
    pub fn budget_exceeded(observed: f64, limit: f64) -> Self {
        let overage = observed - limit;
        Self {
            kind: ViolationKind::BudgetExceeded,
            scope: ViolationScope::Global,
            observed,
            limit,
            overage,
            message: format!("Total cost {observed:.2} exceeds budget {limit:.2}"),
            suggestion: format!("Reduce allocation by {overage:.2}"),
        }
    }

    pub fn sku_cap_exceeded(store: StoreId, observed: usize, limit: u32) -> Self {
        let overage = observed - limit as usize;
        Self {
            kind: ViolationKind::SkuCapExceeded,
            message: format!("Store {store} has {observed} SKUs, exceeds limit of {limit}"),
            suggestion: format!("Remove {overage} SKUs from store {store}"),
            scope: ViolationScope::Store(store),
            observed: observed as f64,
            limit: limit as f64,
            overage: overage as f64,
        }
    }

    pub fn store(&self) -> Option<&StoreId> {
        match &self.scope {
            ViolationScope::Store(store) => Some(store),
            ViolationScope::Global => None,
        }
    }
}

/// Every guardrail breach found in one validation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationReport {
    pub violations: Vec<Violation>,
}

impl ViolationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// True when the plan may proceed to export
    pub fn is_ok(&self) -> bool {
        self.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Deduplicated suggestions, in report order
    pub fn suggestions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for violation in &self.violations {
            if !out.contains(&violation.suggestion) {
                out.push(violation.suggestion.clone());
            }
        }
        if self.of_kind(ViolationKind::BudgetExceeded).next().is_some() {
            out.push("Consider prioritizing higher-scored SKUs".to_string());
        }
        if self.of_kind(ViolationKind::SkuCapExceeded).next().is_some() {
            out.push("Rebalance SKU distribution across stores".to_string());
        }
        out
    }
}
