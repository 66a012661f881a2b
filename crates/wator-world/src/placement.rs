//! Initial placement of fish and sharks.

use crate::grid::Grid;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;
use wator_core::{Cell, Error, Result, Species};

/// Turn `count` distinct water cells, chosen uniformly, into newborn `species`.
///
/// Fails without touching the grid when fewer than `count` water cells remain.
pub fn place_entities<R: Rng + ?Sized>(
    grid: &mut Grid,
    species: Species,
    count: usize,
    shark_starve: u32,
    rng: &mut R,
) -> Result<()> {
    let water = grid.water_positions();
    if count > water.len() {
        return Err(Error::SeedingInfeasible {
            requested: count,
            available: water.len(),
        });
    }

    let newborn = Cell::newborn(species, shark_starve);
    for &pos in water.choose_multiple(rng, count) {
        grid.set(pos, newborn);
    }

    debug!(%species, count, remaining_water = water.len() - count, "Placed entities");
    Ok(())
}
