//! File-backed implementations of the planner traits

pub mod catalog_loader;
pub mod csv_exporter;
pub mod plan_store;

pub use catalog_loader::CsvCatalog;
pub use csv_exporter::CsvExportWriter;
pub use plan_store::JsonPlanStore;
