//! WebServer entry point
//!
//! Serves the planner operations over HTTP using the CSV catalog, the CSV
//! export writer and the JSON plan store.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use planner::{CsvCatalog, CsvExportWriter, JsonPlanStore, SeedPlanner};
use shared::{component_debug, logging, ComponentId, Settings};
use webserver::{WebServer, WebServerError, WebServerResult};

/// Command line arguments; each overrides the matching SEED_* variable
#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "HTTP API for the seed assortment planner")]
struct Args {
    /// Address to bind, e.g. 127.0.0.1:8000
    #[arg(long)]
    bind: Option<String>,

    /// Port on 127.0.0.1 (ignored when --bind is given)
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output directory for exports and published plans
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> WebServerResult<()> {
    let args = Args::parse();
    let component = ComponentId::init_webserver();

    let mut settings = Settings::from_env()?;
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }
    if let Some(out_dir) = args.out_dir {
        settings.out_dir = out_dir;
    }
    match (args.bind, args.port) {
        (Some(bind), _) => settings.bind_addr = bind,
        (None, Some(port)) => settings.bind_addr = format!("127.0.0.1:{port}"),
        (None, None) => {}
    }

    logging::init_tracing_with_level(Some(&settings.log_level));
    logging::log_startup(component, "seed planner webserver");
    component_debug!(component, "Settings: {:?}", settings);

    let bind_address: SocketAddr = settings.bind_addr.parse().map_err(|e: std::net::AddrParseError| {
        WebServerError::InvalidAddress {
            address: settings.bind_addr.clone(),
            reason: e.to_string(),
        }
    })?;

    let planner = SeedPlanner::new(
        settings.clone(),
        CsvCatalog::new(),
        CsvExportWriter::new(&settings.out_dir),
        JsonPlanStore::new(&settings.out_dir),
    )?;

    WebServer::new(bind_address, planner).run().await?;

    logging::log_success(component, "WebServer stopped gracefully");
    Ok(())
}
