//! Wa-Tor ocean engine.
//!
//! This crate implements the toroidal grid where fish and sharks move, eat,
//! breed and starve, and the scheduler that spreads each tick across workers.

pub mod grid;
pub mod placement;
pub mod random;
pub mod rules;
pub mod scheduler;
pub mod simulation;

pub use grid::{CellAccess, Grid};
pub use placement::place_entities;
pub use random::RandomStreams;
pub use rules::{Outcome, Rules};
pub use scheduler::TickScheduler;
pub use simulation::{GridSnapshot, Simulation};
