//! Simulation driver: owns the ocean and advances it tick by tick.

use crate::grid::Grid;
use crate::placement::place_entities;
use crate::random::RandomStreams;
use crate::rules::Rules;
use crate::scheduler::TickScheduler;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, event, info, instrument, trace, Level};
use wator_core::{
    Census, CellKind, Error, Position, Result, RunId, RunSummary, SimulationConfig, Species,
    TickEvents,
};

pub struct Simulation {
    run_id: RunId,
    config: SimulationConfig,
    grid: Grid,
    rules: Rules,
    scheduler: TickScheduler,
    streams: RandomStreams,
    tick: u64,
}

impl Simulation {
    /// Build a simulation over an all-water ocean.
    ///
    /// Configuration and partition errors surface here, before any tick runs.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let grid = Grid::from_config(&config.ocean);
        Self::with_grid(config, grid)
    }

    /// Build a simulation over a prepared grid; the ocean section of `config`
    /// is replaced by the grid's dimensions.
    ///
    /// The grid may come from another run: turn stamps are cleared so every
    /// creature acts on tick 1.
    pub fn with_grid(mut config: SimulationConfig, mut grid: Grid) -> Result<Self> {
        config.ocean.width = grid.width();
        config.ocean.height = grid.height();
        config.validate()?;
        grid.reset_turns();

        let scheduler = TickScheduler::new(config.scheduler.workers, grid.height() as usize)?;
        let run_id = RunId::new();

        info!(
            run_id = %run_id,
            width = grid.width(),
            height = grid.height(),
            workers = scheduler.workers(),
            seed = config.seed,
            "Simulation created"
        );

        Ok(Self {
            run_id,
            rules: Rules::from_config(&config.population),
            streams: RandomStreams::new(config.seed),
            config,
            grid,
            scheduler,
            tick: 0,
        })
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Ticks completed so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Read access for renderers. Cannot overlap a step.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn census(&self) -> Census {
        self.grid.census()
    }

    /// Place the initial populations; fish first, then sharks.
    ///
    /// Only allowed before the first step. Nothing is placed when the two
    /// populations together do not fit in the remaining water.
    pub fn seed(&mut self, fish: usize, sharks: usize) -> Result<()> {
        if self.tick > 0 {
            return Err(Error::InvalidState(format!(
                "cannot seed after {} ticks have run",
                self.tick
            )));
        }

        let available = self.grid.census().water;
        let requested = fish + sharks;
        if requested > available {
            return Err(Error::SeedingInfeasible {
                requested,
                available,
            });
        }

        let mut rng = self.streams.placement();
        let starve = self.rules.shark_starve;
        place_entities(&mut self.grid, Species::Fish, fish, starve, &mut rng)?;
        place_entities(&mut self.grid, Species::Shark, sharks, starve, &mut rng)?;

        info!(run_id = %self.run_id, fish, sharks, "Ocean seeded");
        Ok(())
    }

    /// Seed with the populations named in the configuration
    pub fn seed_from_config(&mut self) -> Result<()> {
        let population = &self.config.population;
        let (fish, sharks) = (population.initial_fish, population.initial_sharks);
        self.seed(fish, sharks)
    }

    /// Advance the ocean by one tick
    pub fn step(&mut self) -> TickEvents {
        self.tick += 1;
        let events = self
            .scheduler
            .step(&mut self.grid, self.tick, &self.rules, &self.streams);
        trace!(
            tick = self.tick,
            fish_born = events.fish_born,
            sharks_born = events.sharks_born,
            fish_eaten = events.fish_eaten,
            sharks_starved = events.sharks_starved,
            "Tick complete"
        );
        events
    }

    /// Run the configured number of ticks
    pub fn run(&mut self) -> RunSummary {
        self.run_ticks(self.config.num_ticks)
    }

    /// Run `num_ticks` ticks, reporting the population along the way
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn run_ticks(&mut self, num_ticks: u64) -> RunSummary {
        info!("Starting simulation for {} ticks", num_ticks);

        let mut summary = RunSummary::new(self.census());
        let report_interval = self.config.report_interval;
        let mut window_start = Instant::now();
        let mut window_ticks = 0u64;

        for _ in 0..num_ticks {
            let events = self.step();
            let census = self.census();
            let was_alive = !summary.final_census.is_empty_ocean();
            summary.record(self.tick, census, events);
            window_ticks += 1;

            if was_alive && census.is_empty_ocean() {
                info!(tick = self.tick, "Ocean is empty");
            }

            if report_interval > 0 && self.tick % report_interval == 0 {
                let elapsed = window_start.elapsed().as_secs_f64();
                let ticks_per_second = if elapsed > 0.0 {
                    window_ticks as f64 / elapsed
                } else {
                    0.0
                };
                self.emit_population_report(census, ticks_per_second);
                window_start = Instant::now();
                window_ticks = 0;
            }
        }

        self.emit_run_summary(&summary);
        summary
    }

    fn emit_population_report(&self, census: Census, ticks_per_second: f64) {
        info!(
            event = "population_report",
            tick = self.tick,
            fish = census.fish,
            sharks = census.sharks,
            water = census.water,
            ticks_per_second = %format_args!("{:.2}", ticks_per_second),
            workers = self.scheduler.workers(),
            "Population report"
        );

        event!(
            Level::DEBUG,
            gauge_name = "ticks_per_second",
            gauge_value = ticks_per_second,
            tick = self.tick,
            "Throughput gauge"
        );
    }

    fn emit_run_summary(&self, summary: &RunSummary) {
        info!(
            event = "run_summary",
            ticks = summary.ticks,
            final_tick = self.tick,
            fish = summary.final_census.fish,
            sharks = summary.final_census.sharks,
            peak_fish = summary.peak_fish,
            peak_sharks = summary.peak_sharks,
            fish_born = summary.events.fish_born,
            sharks_born = summary.events.sharks_born,
            fish_eaten = summary.events.fish_eaten,
            sharks_starved = summary.events.sharks_starved,
            "Run complete"
        );

        match (summary.fish_extinct_at, summary.sharks_extinct_at) {
            (None, None) => debug!("Both species survived the run"),
            (fish, sharks) => info!(
                event = "extinction",
                fish_extinct_at = ?fish,
                sharks_extinct_at = ?sharks,
                "Species went extinct during the run"
            ),
        }
    }

    /// Owned copy of the drawing-level state for the current tick
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            tick: self.tick,
            width: self.grid.width(),
            height: self.grid.height(),
            kinds: self.grid.cells().iter().map(|cell| cell.kind()).collect(),
        }
    }
}

/// What a renderer needs to draw one tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    /// Row-major cell kinds
    pub kinds: Vec<CellKind>,
}

impl GridSnapshot {
    /// Every cell with its position
    pub fn iter(&self) -> impl Iterator<Item = (Position, CellKind)> + '_ {
        let width = self.width as usize;
        self.kinds.iter().enumerate().map(move |(i, kind)| {
            let pos = Position::new((i % width) as i32, (i / width) as i32);
            (pos, *kind)
        })
    }

    pub fn census(&self) -> Census {
        let mut census = Census::new();
        for kind in &self.kinds {
            census.record(*kind);
        }
        census
    }

    /// Serialize the snapshot to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize a snapshot from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
