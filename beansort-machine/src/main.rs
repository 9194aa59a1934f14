//! Beansort machine - main entry point
//!
//! Command-line front end for the sorting machine: ingests the given image
//! files, runs one sorting pass, narrates the machine's progress from the
//! event stream, and prints the final per-lane tally.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beansort_common::config;
use beansort_common::events::SortEvent;
use beansort_common::types::{RoastClass, SortStatus};
use beansort_machine::classifier::RandomClassifier;
use beansort_machine::registry::ItemRegistry;
use beansort_machine::{SharedState, SortingEngine};

/// Command-line arguments for beansort-machine
#[derive(Parser, Debug)]
#[command(name = "beansort-machine")]
#[command(about = "Coffee-bean sorting machine simulator")]
#[command(version)]
struct Args {
    /// Image files to ingest into the sorting queue
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Directory for preview derivatives
    #[arg(long, env = "BEANSORT_PREVIEW_DIR")]
    preview_dir: Option<PathBuf>,

    /// Parameter file (TOML); falls back to BEANSORT_CONFIG, then the
    /// platform config directory, then compiled defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the stub classifier's failure probability
    #[arg(long)]
    error_rate: Option<f64>,

    /// Print the final registry snapshot as JSON instead of a tally
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beansort_machine=info,beansort_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut params =
        config::load_params(args.config.as_deref()).context("Failed to load parameters")?;
    if let Some(rate) = args.error_rate {
        params.error_probability = rate;
        params.validate().context("Invalid --error-rate")?;
    }

    let preview_dir = args
        .preview_dir
        .unwrap_or_else(config::default_preview_dir);
    info!("preview directory: {}", preview_dir.display());

    let registry = ItemRegistry::new(preview_dir).context("Failed to create preview directory")?;
    let state = Arc::new(SharedState::new(registry, params.event_capacity));

    let classes = RoastClass::default_order();
    let classifier = Arc::new(RandomClassifier::new(
        classes.clone(),
        params.error_probability,
    ));

    let engine = SortingEngine::new(
        state.clone(),
        classifier,
        classes.clone(),
        params.layout,
        params.timing,
    );

    // Subscribe before starting so no event is missed
    let mut events = engine.subscribe();

    let ingested = engine
        .ingest(&args.images)
        .await
        .context("Failed to ingest images")?;
    info!("queued {} image(s)", ingested.len());

    if !engine.start().await {
        warn!("nothing to sort");
        return Ok(());
    }

    // Narrate the run; ctrl-c resets the machine mid-flight.
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(SortEvent::ItemStatusChanged { item_id, status, .. }) => {
                        info!("item {} -> {}", item_id, status);
                    }
                    Ok(SortEvent::ItemRouted { item_id, offset, duration_secs, .. }) => {
                        info!(
                            "item {} routed to offset {:.0}px ({:.2}s travel)",
                            item_id, offset, duration_secs
                        );
                    }
                    Ok(SortEvent::RunCompleted { sorted, errored, .. }) => {
                        info!("run complete: {} sorted, {} errored", sorted, errored);
                        break;
                    }
                    Ok(SortEvent::RunAborted { .. }) => {
                        info!("run aborted");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("event stream closed: {}", e);
                        break;
                    }
                }
            }
            _ = signal::ctrl_c() => {
                info!("interrupt received, resetting machine");
                engine.reset().await;
            }
        }
    }

    let snapshot = engine.snapshot().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else if !snapshot.is_empty() {
        println!("--- tally ---");
        for class in &classes {
            let count = snapshot
                .iter()
                .filter(|i| i.status == SortStatus::Sorted && i.label == Some(*class))
                .count();
            println!("{:>8}: {}", class.to_string(), count);
        }
        let errored = snapshot
            .iter()
            .filter(|i| i.status == SortStatus::Errored)
            .count();
        println!("{:>8}: {}", "errors", errored);
    }

    Ok(())
}
