//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Ocean dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanConfig {
    /// Width of the ocean grid (columns)
    pub width: i32,
    /// Height of the ocean grid (rows)
    pub height: i32,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            width: 150,
            height: 150,
        }
    }
}

impl OceanConfig {
    pub fn cell_count(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }
}

/// Initial populations and the life-cycle thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Fish placed before the first tick
    pub initial_fish: usize,
    /// Sharks placed before the first tick
    pub initial_sharks: usize,
    /// Ticks a fish needs before it reproduces
    pub fish_breed: u32,
    /// Ticks a shark needs before it reproduces
    pub shark_breed: u32,
    /// Ticks a shark survives without eating
    pub shark_starve: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_fish: 1000,
            initial_sharks: 500,
            fish_breed: 5,
            shark_breed: 10,
            shark_starve: 7,
        }
    }
}

/// Tick scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of workers the grid scan is split across
    pub workers: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Simulation run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of ticks `Simulation::run` executes
    pub num_ticks: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Ticks between population reports (0 disables them)
    pub report_interval: u64,
    /// Ocean configuration
    pub ocean: OceanConfig,
    /// Population configuration
    pub population: PopulationConfig,
    /// Scheduler configuration
    pub scheduler: SchedulerConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_ticks: 10_000,
            seed: 0,
            report_interval: 100,
            ocean: OceanConfig::default(),
            population: PopulationConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON document; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        debug!(path = %path.display(), "Loaded simulation configuration");
        Ok(config)
    }

    /// Reject parameters no run can start with.
    ///
    /// Population feasibility and worker counts are checked later, by seeding
    /// and scheduler construction respectively.
    pub fn validate(&self) -> Result<()> {
        if self.ocean.width <= 0 || self.ocean.height <= 0 {
            return Err(Error::Validation(format!(
                "ocean must be at least 1x1, got {}x{}",
                self.ocean.width, self.ocean.height
            )));
        }
        if self.population.fish_breed == 0 {
            return Err(Error::Validation("fish_breed must be at least 1".to_string()));
        }
        if self.population.shark_breed == 0 {
            return Err(Error::Validation("shark_breed must be at least 1".to_string()));
        }
        if self.population.shark_starve == 0 {
            return Err(Error::Validation("shark_starve must be at least 1".to_string()));
        }
        Ok(())
    }
}
