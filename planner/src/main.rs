//! Command line entry point for the seed planner
//!
//! Each subcommand reads CSV inputs, runs one planner operation and prints
//! the result as JSON on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use planner::{CsvCatalog, CsvExportWriter, JsonPlanStore, SeedPlanner};
use shared::{
    component_debug, logging, AllocationLine, AutoSeedRequest, ClusterMap, ClusterRequest, ComponentId,
    GenerateRequest, Settings, ValidateRequest,
};

/// Seed assortment planner
#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Clusters stores and builds budget-capped seed assortments")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output directory for exports (overrides SEED_OUT_DIR)
    #[arg(long, global = true)]
    pub out_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Cluster stores by their numeric features
    Cluster {
        /// Stores CSV (defaults to SEED_STORES_CSV)
        #[arg(long)]
        stores: Option<PathBuf>,

        #[command(flatten)]
        clustering: ClusteringArgs,
    },

    /// Generate a draft plan for a cluster map
    Generate {
        #[command(flatten)]
        caps: CapArgs,

        /// JSON file mapping store id to cluster id
        #[arg(long)]
        cluster_map: PathBuf,
    },

    /// Check allocation lines against the guardrails
    Validate {
        #[command(flatten)]
        caps: CapArgs,

        /// JSON file with an array of allocation lines
        #[arg(long)]
        lines: PathBuf,

        /// Optional JSON cluster map restricting which stores may appear
        #[arg(long)]
        cluster_map: Option<PathBuf>,
    },

    /// Cluster, generate, validate and export in one run
    Auto {
        #[command(flatten)]
        caps: CapArgs,

        /// Stores CSV (defaults to SEED_STORES_CSV)
        #[arg(long)]
        stores: Option<PathBuf>,

        #[command(flatten)]
        clustering: ClusteringArgs,
    },
}

#[derive(Args)]
pub struct CapArgs {
    /// SKU catalog CSV
    #[arg(long)]
    pub skus: PathBuf,

    /// Total budget for the plan
    #[arg(long)]
    pub budget: f64,

    /// Maximum distinct SKUs per store (defaults to SEED_MAX_SKUS_PER_STORE)
    #[arg(long, allow_hyphen_values = true)]
    pub max_skus_per_store: Option<i64>,
}

#[derive(Args)]
pub struct ClusteringArgs {
    /// Comma-separated feature columns
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Number of clusters; chosen by silhouette score when omitted
    #[arg(long)]
    pub k: Option<usize>,
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> anyhow::Result<T> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let component = ComponentId::init_planner();

    let mut settings = Settings::from_env().context("loading SEED_* settings")?;
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }
    if let Some(out_dir) = cli.out_dir {
        settings.out_dir = out_dir;
    }
    logging::init_tracing_with_level(Some(&settings.log_level));
    component_debug!(component, "Settings: {:?}", settings);

    let planner = SeedPlanner::new(
        settings.clone(),
        CsvCatalog::new(),
        CsvExportWriter::new(&settings.out_dir),
        JsonPlanStore::new(&settings.out_dir),
    )?;

    match cli.command {
        Command::Cluster { stores, clustering } => {
            let request = ClusterRequest {
                stores_csv: stores.unwrap_or_else(|| settings.default_stores_csv.clone()),
                features: clustering.features,
                k: clustering.k,
                period: None,
            };
            print_json(&planner.cluster(request).await?)?;
        }

        Command::Generate { caps, cluster_map } => {
            let cluster_map: ClusterMap = read_json(&cluster_map).await?;
            let request = GenerateRequest {
                skus_csv: caps.skus,
                cluster_map,
                budget: caps.budget,
                max_skus_per_store: caps.max_skus_per_store,
            };
            print_json(&planner.generate(request).await?)?;
        }

        Command::Validate { caps, lines, cluster_map } => {
            let lines: Vec<AllocationLine> = read_json(&lines).await?;
            let cluster_map: Option<ClusterMap> = match cluster_map {
                Some(path) => Some(read_json(&path).await?),
                None => None,
            };
            let request = ValidateRequest {
                lines,
                skus_csv: caps.skus,
                budget: caps.budget,
                max_skus_per_store: caps.max_skus_per_store,
                cluster_map,
            };
            let response = planner.validate(request).await?;
            print_json(&response)?;
            if !response.ok {
                return Ok(ExitCode::from(2));
            }
        }

        Command::Auto { caps, stores, clustering } => {
            logging::log_startup(component, "one-shot seed pipeline");
            let request = AutoSeedRequest {
                skus_csv: caps.skus,
                stores_csv: stores,
                budget: caps.budget,
                max_skus_per_store: caps.max_skus_per_store,
                features: clustering.features,
                k: clustering.k,
                cluster_map: None,
            };
            let run = planner.auto_seed(request).await?;
            print_json(&run)?;

            match &run.export {
                Some(receipt) => {
                    logging::log_success(component, &format!("Plan exported to {}", receipt.path.display()));
                }
                None => {
                    logging::log_progress(component, "Export skipped", "plan failed validation");
                    return Ok(ExitCode::from(2));
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
