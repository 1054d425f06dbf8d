//! NOC Daemon - telecom alarm work-order diagnosis service
//!
//! Loads the rule catalog, opens the work-order store, and serves the
//! diagnosis API over HTTP.

use anyhow::{Context, Result};
use noc_common::catalog::RuleCatalog;
use noc_common::{DiagnosisEngine, NocdConfig};
use nocd::lookup::StaticLookupTable;
use nocd::readings::StaticOpticalReadings;
use nocd::server::{self, AppState};
use nocd::solutions::FileSolutionStore;
use nocd::store::SqliteWorkOrderStore;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::var("NOCD_CONFIG") {
        Ok(path) => NocdConfig::load_from(Path::new(&path))?,
        Err(_) => NocdConfig::load()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter).context("invalid log_filter")?)
        .init();

    info!("nocd v{} starting", env!("CARGO_PKG_VERSION"));

    let catalog = Arc::new(match &config.catalog_path {
        Some(path) => RuleCatalog::load_from_file(path)?,
        None => RuleCatalog::with_defaults(),
    });
    info!("rule catalog loaded: {:?}", catalog.rule_set_names());

    let readings = match &config.readings_path {
        Some(path) => StaticOpticalReadings::load_from_file(path)?,
        None => StaticOpticalReadings::with_defaults(),
    };

    let store = Arc::new(SqliteWorkOrderStore::open(&config.database_path)?);
    info!("work order store at {}", config.database_path.display());

    let engine = Arc::new(DiagnosisEngine::new(
        Arc::clone(&catalog),
        Arc::clone(&store) as Arc<dyn noc_common::WorkOrderStore>,
        Arc::new(readings),
        Arc::new(StaticLookupTable::with_defaults()),
        Arc::new(FileSolutionStore::new(config.solutions_dir.clone())),
    ));

    let state = AppState::new(engine, store, catalog);
    server::run(state, &config.listen_addr).await
}
