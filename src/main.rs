use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use podshelf::cli::Cli;
use podshelf::logging::{self, LogBuffer};
use podshelf::registry::Registry;
use podshelf::web::AppState;
use podshelf::{config, scheduler, source, web};

fn main() -> Result<()> {
    let logs = LogBuffer::default();
    logging::init(logs.clone())?;

    // -- parse arguments -----------------------------------------------------
    let cli = Cli::parse();
    let addr = cli.listen_addr()?;

    // -- configure sources ---------------------------------------------------
    let configs = match &cli.sources {
        Some(path) => config::load(path)?,
        None => config::default_sources(),
    };
    let client = source::http_client().context("failed to build HTTP client")?;
    let registry = Arc::new(Registry::new(config::build_sources(configs, &client)?)?);
    info!(sources = registry.len(), %addr, "podshelf starting");

    // -- start periodic refresh ----------------------------------------------
    scheduler::spawn(registry.clone(), Duration::from_secs(cli.interval_secs))
        .context("failed to start scheduler")?;

    // -- serve until Ctrl+C --------------------------------------------------
    web::run(addr, AppState { registry, logs })
}
