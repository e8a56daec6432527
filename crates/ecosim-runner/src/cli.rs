//! Command-line interface.

use anyhow::{Context, Result};
use clap::Parser;
use ecosim_core::LifeConfig;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ecosim",
    version,
    about = "Headless predator-prey simulation runner",
    long_about = None
)]
pub struct Cli {
    /// JSON file mapping parameter names to numbers
    #[arg(short, long)]
    pub params: Option<PathBuf>,
    /// Override one parameter, e.g. --set grid_rows=20 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub overrides: Vec<(String, f64)>,
    /// Random seed (overrides the parameter file)
    #[arg(long)]
    pub seed: Option<u64>,
    /// Stop after this many iterations (overrides the parameter file)
    #[arg(short = 'n', long)]
    pub max_iterations: Option<u64>,
    /// Log a population snapshot every N iterations (0 disables)
    #[arg(long, default_value_t = 100)]
    pub report_every: u64,
    /// Log and skip steps that fail with an invalid position instead of aborting
    #[arg(long)]
    pub skip_invalid_steps: bool,
    /// Give up after this many consecutive skipped steps
    #[arg(long, default_value_t = 1_000)]
    pub max_consecutive_skips: u64,
    /// Capacity of the action channel between the stepper and the consumer
    #[arg(long, default_value_t = 256)]
    pub channel_capacity: usize,
    /// Write the run summary as JSON to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Parameter file, then `--set` overrides, then dedicated flags; validated last.
    pub fn load_config(&self) -> Result<LifeConfig> {
        let mut config = match &self.params {
            Some(path) => LifeConfig::from_json_file(path)
                .with_context(|| format!("loading parameters from {}", path.display()))?,
            None => LifeConfig::default(),
        };

        let overrides: HashMap<String, f64> = self.overrides.iter().cloned().collect();
        config.apply_params(&overrides)?;
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = Some(max_iterations);
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_assignment(raw: &str) -> std::result::Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid number in '{raw}': {e}"))?;
    Ok((key.to_string(), value))
}
