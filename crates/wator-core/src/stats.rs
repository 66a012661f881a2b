//! Population counts and per-tick statistics.

use crate::types::{Cell, CellKind};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// How many cells of each kind an ocean holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub fish: usize,
    pub sharks: usize,
    pub water: usize,
}

impl Census {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the cells of an ocean
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut census = Self::new();
        for cell in cells {
            census.record(cell.kind());
        }
        census
    }

    pub fn record(&mut self, kind: CellKind) {
        match kind {
            CellKind::Water => self.water += 1,
            CellKind::Fish => self.fish += 1,
            CellKind::Shark => self.sharks += 1,
        }
    }

    /// Total number of cells counted
    pub fn total(&self) -> usize {
        self.fish + self.sharks + self.water
    }

    pub fn is_empty_ocean(&self) -> bool {
        self.fish == 0 && self.sharks == 0
    }
}

/// Life-cycle events that happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    pub fish_born: u64,
    pub sharks_born: u64,
    pub fish_eaten: u64,
    pub sharks_starved: u64,
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Add for TickEvents {
    type Output = TickEvents;

    fn add(mut self, other: TickEvents) -> TickEvents {
        self += other;
        self
    }
}

impl AddAssign for TickEvents {
    fn add_assign(&mut self, other: TickEvents) {
        self.fish_born += other.fish_born;
        self.sharks_born += other.sharks_born;
        self.fish_eaten += other.fish_eaten;
        self.sharks_starved += other.sharks_starved;
    }
}

/// Aggregated outcome of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ticks executed by this run
    pub ticks: u64,
    /// Population after the last tick
    pub final_census: Census,
    pub peak_fish: usize,
    pub peak_sharks: usize,
    /// First tick after which no fish were left
    pub fish_extinct_at: Option<u64>,
    /// First tick after which no sharks were left
    pub sharks_extinct_at: Option<u64>,
    /// Events summed over every tick of the run
    pub events: TickEvents,
}

impl RunSummary {
    /// Start a summary from the population before the first tick
    pub fn new(initial: Census) -> Self {
        Self {
            final_census: initial,
            peak_fish: initial.fish,
            peak_sharks: initial.sharks,
            ..Default::default()
        }
    }

    /// Fold one tick into the summary
    pub fn record(&mut self, tick: u64, census: Census, events: TickEvents) {
        self.ticks += 1;
        self.peak_fish = self.peak_fish.max(census.fish);
        self.peak_sharks = self.peak_sharks.max(census.sharks);

        if census.fish == 0 && self.final_census.fish > 0 && self.fish_extinct_at.is_none() {
            self.fish_extinct_at = Some(tick);
        }
        if census.sharks == 0 && self.final_census.sharks > 0 && self.sharks_extinct_at.is_none() {
            self.sharks_extinct_at = Some(tick);
        }

        self.final_census = census;
        self.events += events;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_census_counts() {
        let cells = [
            Cell::water(),
            Cell::fish(0),
            Cell::fish(2),
            Cell::shark(0, 3),
            Cell::water(),
        ];
        let census = Census::from_cells(&cells);
        assert_eq!(census.fish, 2);
        assert_eq!(census.sharks, 1);
        assert_eq!(census.water, 2);
        assert_eq!(census.total(), 5);
        assert!(!census.is_empty_ocean());
    }

    #[test]
    fn test_tick_events_sum() {
        let a = TickEvents {
            fish_born: 2,
            fish_eaten: 1,
            ..Default::default()
        };
        let b = TickEvents {
            fish_born: 1,
            sharks_starved: 4,
            ..Default::default()
        };
        let total = a + b;
        assert_eq!(total.fish_born, 3);
        assert_eq!(total.fish_eaten, 1);
        assert_eq!(total.sharks_starved, 4);
        assert_eq!(total.sharks_born, 0);
    }

    #[test]
    fn test_run_summary_tracks_peaks_and_extinction() {
        let start = Census {
            fish: 10,
            sharks: 2,
            water: 88,
        };
        let mut summary = RunSummary::new(start);

        summary.record(
            1,
            Census {
                fish: 14,
                sharks: 1,
                water: 85,
            },
            TickEvents {
                fish_born: 4,
                sharks_starved: 1,
                ..Default::default()
            },
        );
        summary.record(
            2,
            Census {
                fish: 12,
                sharks: 0,
                water: 88,
            },
            TickEvents {
                sharks_starved: 1,
                ..Default::default()
            },
        );
        summary.record(
            3,
            Census {
                fish: 13,
                sharks: 0,
                water: 87,
            },
            TickEvents::new(),
        );

        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.peak_fish, 14);
        assert_eq!(summary.peak_sharks, 2);
        assert_eq!(summary.sharks_extinct_at, Some(2));
        assert_eq!(summary.fish_extinct_at, None);
        assert_eq!(summary.events.sharks_starved, 2);
        assert_eq!(summary.final_census.fish, 13);
    }
}
