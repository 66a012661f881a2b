//! Tick scheduler: one full grid scan split across a pool of workers.
//!
//! Every worker owns a contiguous range of rows. A cell's transition may
//! write to the rows directly above and below it, so rows are scanned in
//! phases: rows in the same phase are at least three apart (toroidally), which
//! makes the three-row windows they touch disjoint. Each phase hands every
//! worker exclusive borrows of the windows centered in its rows, then joins all
//! workers before the next phase starts.
//!
//! Phases depend only on the grid height and random draws are keyed by row,
//! so a tick produces the same grid for any worker count.

use crate::grid::{CellAccess, Grid};
use crate::random::RandomStreams;
use crate::rules::Rules;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::ops::Range;
use tracing::debug;
use wator_core::{Cell, Error, Position, Result, TickEvents};

/// Rows that share a phase are at least this far apart
const PHASE_STRIDE: usize = 3;

#[derive(Debug)]
pub struct TickScheduler {
    pool: ThreadPool,
    rows: usize,
    partitions: Vec<Range<usize>>,
    phases: Vec<Vec<usize>>,
}

impl TickScheduler {
    /// Build a scheduler for a grid with `rows` rows.
    ///
    /// Fails with [`Error::Partition`] when `workers` is zero or exceeds `rows`.
    pub fn new(workers: usize, rows: usize) -> Result<Self> {
        if workers == 0 || workers > rows {
            return Err(Error::Partition { workers, rows });
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("wator-worker-{}", i))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        let partitions = partition_rows(rows, workers);
        let phases = row_phases(rows);
        debug!(workers, rows, phases = phases.len(), "Tick scheduler ready");

        Ok(Self {
            pool,
            rows,
            partitions,
            phases,
        })
    }

    pub fn workers(&self) -> usize {
        self.partitions.len()
    }

    /// Row range owned by each worker
    pub fn partitions(&self) -> &[Range<usize>] {
        &self.partitions
    }

    /// Rows scanned together, in phase order
    pub fn phases(&self) -> &[Vec<usize>] {
        &self.phases
    }

    fn partition_of(&self, row: usize) -> usize {
        self.partitions.partition_point(|range| range.end <= row)
    }

    /// Evaluate every cell of `grid` once for `tick`.
    ///
    /// Returns after all workers have finished the last phase.
    pub fn step(
        &self,
        grid: &mut Grid,
        tick: u64,
        rules: &Rules,
        streams: &RandomStreams,
    ) -> TickEvents {
        assert_eq!(
            grid.height() as usize,
            self.rows,
            "scheduler was built for a different grid height"
        );

        let mut events = TickEvents::new();
        for phase in &self.phases {
            events += self.run_phase(grid, phase, tick, rules, streams);
        }
        events
    }

    fn run_phase(
        &self,
        grid: &mut Grid,
        phase: &[usize],
        tick: u64,
        rules: &Rules,
        streams: &RandomStreams,
    ) -> TickEvents {
        let (width, height) = (grid.width(), grid.height());

        let mut owner = vec![None; self.rows];
        for (window, &center) in phase.iter().enumerate() {
            for row in window_rows(center, self.rows) {
                owner[row] = Some(window);
            }
        }

        let mut windows: Vec<RowWindow<'_>> = phase
            .iter()
            .map(|&center| RowWindow::new(center, width, height))
            .collect();
        for (y, row) in grid.rows_mut().enumerate() {
            if let Some(window) = owner[y] {
                windows[window].rows.push((y, row));
            }
        }

        let mut batches: Vec<Vec<RowWindow<'_>>> =
            (0..self.workers()).map(|_| Vec::new()).collect();
        for window in windows {
            batches[self.partition_of(window.center)].push(window);
        }

        self.pool.install(|| {
            batches
                .into_par_iter()
                .map(|batch| {
                    let mut events = TickEvents::new();
                    for mut window in batch {
                        let center = window.center;
                        let mut rng = streams.row(tick, center);
                        events += rules.evaluate_row(&mut window, center as i32, tick, &mut rng);
                    }
                    events
                })
                .reduce(TickEvents::new, |a, b| a + b)
        })
    }
}

/// Split `rows` into `workers` contiguous ranges; the last takes the remainder
pub fn partition_rows(rows: usize, workers: usize) -> Vec<Range<usize>> {
    let per_worker = rows / workers;
    (0..workers)
        .map(|i| {
            let start = i * per_worker;
            let end = if i == workers - 1 { rows } else { start + per_worker };
            start..end
        })
        .collect()
}

/// Group rows into phases whose three-row windows never overlap.
///
/// Rows below the largest multiple of three cycle through three phases; each
/// leftover row gets a phase of its own.
pub fn row_phases(rows: usize) -> Vec<Vec<usize>> {
    let banded = rows - rows % PHASE_STRIDE;
    let mut phases: Vec<Vec<usize>> = (0..PHASE_STRIDE.min(banded))
        .map(|first| (first..banded).step_by(PHASE_STRIDE).collect())
        .collect();
    phases.extend((banded..rows).map(|row| vec![row]));
    phases
}

/// Distinct rows touched by cells in `center`
fn window_rows(center: usize, rows: usize) -> Vec<usize> {
    let mut window = vec![(center + rows - 1) % rows, center, (center + 1) % rows];
    window.sort_unstable();
    window.dedup();
    window
}

/// Exclusive borrow of one row and the rows next to it
struct RowWindow<'a> {
    center: usize,
    width: i32,
    height: i32,
    rows: Vec<(usize, &'a mut [Cell])>,
}

impl<'a> RowWindow<'a> {
    fn new(center: usize, width: i32, height: i32) -> Self {
        Self {
            center,
            width,
            height,
            rows: Vec::with_capacity(PHASE_STRIDE),
        }
    }

    fn row(&self, y: usize) -> &[Cell] {
        match self.rows.iter().find(|(index, _)| *index == y) {
            Some((_, row)) => &**row,
            None => unreachable!("row {} is outside the window around row {}", y, self.center),
        }
    }

    fn row_mut(&mut self, y: usize) -> &mut [Cell] {
        let center = self.center;
        match self.rows.iter_mut().find(|(index, _)| *index == y) {
            Some((_, row)) => &mut **row,
            None => unreachable!("row {} is outside the window around row {}", y, center),
        }
    }
}

impl CellAccess for RowWindow<'_> {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn cell(&self, pos: Position) -> Cell {
        self.row(pos.y as usize)[pos.x as usize]
    }

    fn set_cell(&mut self, pos: Position, cell: Cell) {
        self.row_mut(pos.y as usize)[pos.x as usize] = cell;
    }
}
