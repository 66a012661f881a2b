//! Headless Wa-Tor runner.
//!
//! Usage: `wator [config.json]`. `WATOR_SEED`, `WATOR_TICKS` and
//! `WATOR_WORKERS` override single fields of the loaded configuration.

mod telemetry;

use anyhow::{Context, Result};
use std::str::FromStr;
use tracing::{error, info};
use wator_core::SimulationConfig;
use wator_world::Simulation;

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = load_config(std::env::args().nth(1))?;
    info!(
        width = config.ocean.width,
        height = config.ocean.height,
        fish = config.population.initial_fish,
        sharks = config.population.initial_sharks,
        workers = config.scheduler.workers,
        ticks = config.num_ticks,
        "Starting Wa-Tor"
    );

    // Configuration errors stop the run before any tick executes
    let mut simulation =
        Simulation::new(config).inspect_err(|e| error!("Invalid configuration: {}", e))?;
    simulation
        .seed_from_config()
        .inspect_err(|e| error!("Seeding failed: {}", e))?;

    let summary = simulation.run();
    info!(
        ticks = summary.ticks,
        fish = summary.final_census.fish,
        sharks = summary.final_census.sharks,
        "Shutting down"
    );

    Ok(())
}

fn load_config(path: Option<String>) -> Result<SimulationConfig> {
    let mut config = match path {
        Some(path) => SimulationConfig::load(&path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => SimulationConfig::default(),
    };
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Apply single-field overrides looked up through `lookup`
fn apply_overrides(
    config: &mut SimulationConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(seed) = parse_override(&lookup, "WATOR_SEED")? {
        config.seed = seed;
    }
    if let Some(ticks) = parse_override(&lookup, "WATOR_TICKS")? {
        config.num_ticks = ticks;
    }
    if let Some(workers) = parse_override(&lookup, "WATOR_WORKERS")? {
        config.scheduler.workers = workers;
    }
    Ok(())
}

fn parse_override<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number, got {:?}", key, value))
        })
        .transpose()
}
