//! Runtime settings shared by the planner CLI and the webserver
//!
//! Values come from `SEED_*` environment variables (a `.env` file is read
//! first when present). Command line flags override them in each binary.

use crate::errors::{SharedError, SharedResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub bind_addr: String,
    pub log_level: String,
    pub cors_allow_origins: Vec<String>,
    pub default_max_skus_per_store: u32,
    pub baseline_quantity: u32,
    pub default_stores_csv: PathBuf,
    pub default_features: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("out"),
            bind_addr: "127.0.0.1:8000".to_string(),
            log_level: "info".to_string(),
            cors_allow_origins: vec!["*".to_string()],
            default_max_skus_per_store: 200,
            baseline_quantity: 1,
            default_stores_csv: PathBuf::from("data/stores.csv"),
            default_features: vec!["capacity".to_string(), "footfall".to_string()],
        }
    }
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first
    pub fn from_env() -> SharedResult<Self> {
        // A missing .env file is the common case
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> SharedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(v) = lookup("SEED_DATA_DIR") {
            settings.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("SEED_OUT_DIR") {
            settings.out_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("SEED_BIND_ADDR") {
            settings.bind_addr = v;
        }
        if let Some(v) = lookup("SEED_LOG_LEVEL") {
            settings.log_level = v;
        }
        if let Some(v) = lookup("SEED_CORS_ALLOW_ORIGINS") {
            settings.cors_allow_origins = split_list(&v);
        }
        if let Some(v) = lookup("SEED_MAX_SKUS_PER_STORE") {
            settings.default_max_skus_per_store = v
                .trim()
                .parse()
                .map_err(|_| SharedError::invalid_config("SEED_MAX_SKUS_PER_STORE", &v))?;
        }
        if let Some(v) = lookup("SEED_BASELINE_QUANTITY") {
            let qty: u32 = v
                .trim()
                .parse()
                .map_err(|_| SharedError::invalid_config("SEED_BASELINE_QUANTITY", &v))?;
            if qty == 0 {
                return Err(SharedError::invalid_config("SEED_BASELINE_QUANTITY", qty));
            }
            settings.baseline_quantity = qty;
        }
        match lookup("SEED_STORES_CSV") {
            Some(v) => settings.default_stores_csv = PathBuf::from(v),
            None => settings.default_stores_csv = settings.data_dir.join("stores.csv"),
        }
        if let Some(v) = lookup("SEED_FEATURES") {
            let features = split_list(&v);
            if features.is_empty() {
                return Err(SharedError::invalid_config("SEED_FEATURES", v));
            }
            settings.default_features = features;
        }

        Ok(settings)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
