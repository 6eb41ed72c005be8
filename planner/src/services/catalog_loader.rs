//! CSV catalog loading
//!
//! SKU files need `sku_id` and `cost` (or `price`) columns, with optional
//! `category` and `category_score` (or `priority`). Store files need
//! `store_id` plus every requested feature column. Rows with a blank
//! required value are dropped; malformed numbers fail the load.

use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use shared::{component_debug, ComponentId, Sku, SkuId, Store, StoreId};
use tokio::fs;

use crate::error::{PlannerError, PlannerResult};
use crate::traits::CatalogSource;

#[derive(Debug, Deserialize)]
struct SkuRecord {
    #[serde(default)]
    sku_id: Option<String>,
    #[serde(default, alias = "price")]
    cost: Option<f64>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, alias = "priority")]
    category_score: Option<f64>,
}

fn load_error(path: &str, message: impl Into<String>) -> PlannerError {
    PlannerError::CatalogLoadError {
        path: path.to_string(),
        message: message.into(),
    }
}

/// Parse a SKU catalog, keeping file order
pub fn read_skus<R: Read>(reader: R, origin: &str) -> PlannerResult<Vec<Sku>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut skus = Vec::new();
    let mut dropped = 0usize;

    for (row, record) in csv_reader.deserialize::<SkuRecord>().enumerate() {
        let record = record.map_err(|e| load_error(origin, format!("row {}: {e}", row + 1)))?;
        let (Some(id), Some(price)) = (record.sku_id.filter(|s| !s.is_empty()), record.cost) else {
            dropped += 1;
            continue;
        };
        let priority = record.category_score.unwrap_or(0.0);
        if !price.is_finite() || !priority.is_finite() {
            return Err(load_error(origin, format!("row {}: cost and category_score must be finite", row + 1)));
        }
        skus.push(Sku {
            id: SkuId::new(id),
            price,
            priority,
            category: record.category.filter(|c| !c.is_empty()),
        });
    }

    if dropped > 0 {
        component_debug!(ComponentId::current(), "Dropped {} incomplete SKU rows from {}", dropped, origin);
    }
    Ok(skus)
}

/// Parse a stores file, reading only `store_id` and the named features
pub fn read_stores<R: Read>(reader: R, origin: &str, features: &[String]) -> PlannerResult<Vec<Store>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let id_col = column("store_id").ok_or_else(|| PlannerError::config("stores_csv", "missing store_id column"))?;
    let feature_cols: Vec<(String, usize)> = features
        .iter()
        .map(|name| {
            column(name)
                .map(|idx| (name.clone(), idx))
                .ok_or_else(|| PlannerError::config("features", format!("unknown feature column '{name}'")))
        })
        .collect::<PlannerResult<_>>()?;

    let mut stores = Vec::new();
    let mut dropped = 0usize;

    'rows: for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let id = record.get(id_col).unwrap_or("");
        if id.is_empty() {
            dropped += 1;
            continue;
        }

        let mut store = Store::new(id);
        for (name, idx) in &feature_cols {
            let raw = record.get(*idx).unwrap_or("");
            if raw.is_empty() {
                dropped += 1;
                continue 'rows;
            }
            let value: f64 = raw
                .parse()
                .ok()
                .filter(|v: &f64| v.is_finite())
                .ok_or_else(|| load_error(origin, format!("row {}: {name} is not a finite number", row + 1)))?;
            store.features.insert(name.clone(), value);
        }
        stores.push(store);
    }

    if dropped > 0 {
        component_debug!(ComponentId::current(), "Dropped {} incomplete store rows from {}", dropped, origin);
    }
    Ok(stores)
}

/// Catalog source backed by CSV files on disk
#[derive(Debug, Clone, Default)]
pub struct CsvCatalog;

impl CsvCatalog {
    pub fn new() -> Self {
        Self
    }

    async fn read(&self, path: &Path) -> PlannerResult<Vec<u8>> {
        fs::read(path)
            .await
            .map_err(|e| load_error(&path.display().to_string(), e.to_string()))
    }
}

#[async_trait]
impl CatalogSource for CsvCatalog {
    async fn load_skus(&self, path: &Path) -> PlannerResult<Vec<Sku>> {
        let bytes = self.read(path).await?;
        read_skus(bytes.as_slice(), &path.display().to_string())
    }

    async fn load_stores(&self, path: &Path, features: &[String]) -> PlannerResult<Vec<Store>> {
        let bytes = self.read(path).await?;
        let stores = read_stores(bytes.as_slice(), &path.display().to_string(), features)?;
        if let Some(dup) = first_duplicate(&stores) {
            return Err(PlannerError::config("stores_csv", format!("duplicate store id '{dup}'")));
        }
        Ok(stores)
    }
}

fn first_duplicate(stores: &[Store]) -> Option<&StoreId> {
    let mut seen = std::collections::HashSet::new();
    stores.iter().map(|s| &s.id).find(|id| !seen.insert(*id))
}
