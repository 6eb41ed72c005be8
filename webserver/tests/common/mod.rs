//! Test helpers for the HTTP API tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use planner::{CsvCatalog, CsvExportWriter, JsonPlanStore, SeedPlanner};
use serde_json::Value;
use shared::Settings;
use tempfile::TempDir;
use tower::ServiceExt;
use webserver::WebServer;

pub const SKUS_CSV: &str = "sku_id,category,cost,category_score\n\
                            SKU1,tops,10,0.9\n\
                            SKU2,tops,20,0.8\n";

pub const STORES_CSV: &str = "store_id,capacity,footfall\n\
                              S1,100,1000\n\
                              S2,102,1010\n\
                              S3,98,990\n\
                              S4,500,5000\n\
                              S5,505,5050\n\
                              S6,495,4950\n\
                              S7,1000,200\n\
                              S8,1010,210\n\
                              S9,990,190\n";

/// Webserver over real file-backed services in a temp directory
pub struct TestServer {
    pub temp: TempDir,
    pub skus_csv: PathBuf,
    pub stores_csv: PathBuf,
    pub out_dir: PathBuf,
    pub router: Router,
}

impl TestServer {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let skus_csv = write_file(temp.path(), "skus.csv", SKUS_CSV);
        let stores_csv = write_file(temp.path(), "stores.csv", STORES_CSV);
        let out_dir = temp.path().join("out");

        let settings = Settings {
            out_dir: out_dir.clone(),
            default_stores_csv: stores_csv.clone(),
            ..Settings::default()
        };
        let planner = SeedPlanner::new(
            settings,
            CsvCatalog::new(),
            CsvExportWriter::new(&out_dir),
            JsonPlanStore::new(&out_dir),
        )
        .unwrap();
        let address: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let router = WebServer::new(address, planner).build_router().unwrap();

        Self {
            temp,
            skus_csv,
            stores_csv,
            out_dir,
            router,
        }
    }

    /// POST a JSON body and return the status and parsed response
    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(self.router.clone(), request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(self.router.clone(), request).await
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
