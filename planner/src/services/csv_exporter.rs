//! CSV export of accepted plans
//!
//! Writes `{plan_id}_{unix_ms}.csv` under the output directory with one row
//! per allocation line. Files are created exclusively; a name already taken
//! gets a `_{n}` suffix, so concurrent exports of one plan id never share a
//! file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use shared::{component_debug, AllocationLine, ComponentId};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::{PlannerError, PlannerResult};
use crate::traits::{ExportReceipt, ExportWriter};

#[derive(Serialize)]
struct ExportRow<'a> {
    sku_id: &'a str,
    store_id: &'a str,
    quantity: u32,
}

/// Render lines as CSV bytes with a `sku_id,store_id,quantity` header
pub fn render_csv(lines: &[AllocationLine]) -> PlannerResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(["sku_id", "store_id", "quantity"])?;
    for line in lines {
        writer.serialize(ExportRow {
            sku_id: line.sku_id.as_str(),
            store_id: line.store_id.as_str(),
            quantity: line.quantity.get(),
        })?;
    }
    writer.into_inner().map_err(|e| PlannerError::ExportError {
        path: "<buffer>".to_string(),
        message: e.to_string(),
    })
}

/// Keep file names to characters that are safe on every platform
fn file_stem(plan_id: &str) -> String {
    let stem: String = plan_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "plan".to_string()
    } else {
        stem
    }
}

/// Export writer producing flat CSV files
#[derive(Debug, Clone)]
pub struct CsvExportWriter {
    out_dir: PathBuf,
}

impl CsvExportWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into() }
    }

    pub fn out_dir(&self) -> &PathBuf {
        &self.out_dir
    }

    /// Create a file that did not exist before under `out_dir`
    async fn create_unique(&self, stem: &str) -> PlannerResult<(PathBuf, File)> {
        let base = format!("{}_{}", stem, chrono::Utc::now().timestamp_millis());
        let mut attempt = 0u32;
        loop {
            let name = match attempt {
                0 => format!("{base}.csv"),
                n => format!("{base}_{n}.csv"),
            };
            let path = self.out_dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(export_error(&path, e)),
            }
        }
    }
}

fn export_error(path: &Path, e: std::io::Error) -> PlannerError {
    PlannerError::ExportError {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl ExportWriter for CsvExportWriter {
    async fn write_plan(
        &self,
        plan_id: &str,
        lines: &[AllocationLine],
        total_spend: f64,
    ) -> PlannerResult<ExportReceipt> {
        let bytes = render_csv(lines)?;
        fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|e| export_error(&self.out_dir, e))?;

        let (path, mut file) = self.create_unique(&file_stem(plan_id)).await?;
        file.write_all(&bytes).await.map_err(|e| export_error(&path, e))?;
        file.flush().await.map_err(|e| export_error(&path, e))?;

        component_debug!(ComponentId::current(), "💾 Wrote {} rows to {}", lines.len(), path.display());

        Ok(ExportReceipt {
            path,
            rows: lines.len(),
            total_spend,
        })
    }
}
