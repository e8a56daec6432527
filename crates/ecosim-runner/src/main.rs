//! Headless runner for the ecosim predator-prey simulation.

mod cli;
mod driver;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use ecosim_world::{Life, LifeView};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, error, info, Instrument};
use uuid::Uuid;

use crate::cli::Cli;
use crate::driver::DriverOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_telemetry(cli.log_json)?;

    let config = cli.load_config()?;
    let life = Life::new(config)?;

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id);

    info!(
        parent: &span,
        seed = ?life.seed(),
        rows = life.grid_rows(),
        cols = life.grid_cols(),
        population = life.population(),
        max_iterations = ?life.max_iterations(),
        "Starting simulation"
    );

    for (predator, prey) in driver::food_chain(&life) {
        debug!(parent: &span, %predator, prey = ?prey, "Food chain");
    }

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        flag.store(true, Ordering::Relaxed);
    });

    let options = DriverOptions {
        report_every: cli.report_every,
        skip_invalid_steps: cli.skip_invalid_steps,
        max_consecutive_skips: cli.max_consecutive_skips,
        channel_capacity: cli.channel_capacity,
    };

    let summary = driver::run(life, options, stop).instrument(span.clone()).await?;
    span.in_scope(|| summary.log());

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing summary to {}", path.display()))?;
        info!(path = %path.display(), "Summary written");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
