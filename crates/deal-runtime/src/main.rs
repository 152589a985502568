//! # Deal Runtime
//!
//! Loads an apartment-deal export once, builds the range index and serves
//! lookups over HTTP until interrupted. See the library docs for the
//! startup sequence.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use deal_gateway::DealGateway;
use deal_index::{ingest_csv, verify_snapshot, DealLookupApi, DealLookupService, DealSnapshot};
use deal_runtime::{logging, query, Args, IngestConfig};

/// Load and index the export on a blocking thread.
async fn load_snapshot(path: PathBuf, ingest: IngestConfig) -> Result<DealSnapshot> {
    let started = Instant::now();
    let file = path.display().to_string();

    let snapshot = tokio::task::spawn_blocking(move || {
        ingest_csv(&path, &ingest.csv(), ingest.index())
    })
    .await
    .context("Index build task failed")?
    .with_context(|| format!("Failed to load {}", file))?;

    let stats = snapshot.stats();
    info!(
        file = %file,
        records = stats.records,
        regions = stats.regions,
        sub_regions = stats.sub_regions,
        complexes = stats.complexes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Deal index ready"
    );
    Ok(snapshot)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    info!("Received shutdown signal");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = args
        .resolve_config(|key| std::env::var(key).ok())
        .context("Failed to load configuration")?;

    // Initialize logging
    logging::init(&config.logging).context("Failed to initialize logging")?;

    info!("===========================================");
    info!("  Deal Runtime v{}", deal_index::VERSION);
    info!("===========================================");
    info!(
        order_policy = ?config.ingest.order_policy,
        header_lines = config.ingest.header_lines,
        "Loading deal export"
    );

    let params = query::parse_params(args.params.as_deref())?;
    let snapshot = load_snapshot(args.data_file.clone(), config.ingest.clone()).await?;

    if config.ingest.verify_after_build {
        verify_snapshot(&snapshot).context("Index failed invariant verification")?;
        info!("Index invariants verified");
    }

    if let Some(method) = &args.query {
        let result = query::run_query(Arc::new(snapshot), method, &params)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let api: Arc<dyn DealLookupApi> = Arc::new(DealLookupService::new(Arc::new(snapshot)));
    let gateway =
        DealGateway::new(config.gateway.clone(), api).context("Invalid gateway configuration")?;

    info!("Serving lookups. Press Ctrl+C to stop.");
    gateway
        .run(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutdown complete");
    Ok(())
}
