//! Core type definitions for the ocean.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 2D position in the ocean. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// One cell over in `direction`, not yet wrapped
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.add(dx, dy)
    }

    /// Apply toroidal wrapping for given ocean dimensions
    pub fn wrap(&self, width: i32, height: i32) -> Self {
        Self {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal direction for movement and predation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Order in which a shark looks for adjacent fish
    pub const PREY_SCAN: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Draw one of the four directions uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::all()[rng.gen_range(0..4)]
    }
}

/// What Entity Placement can put into the ocean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Fish,
    Shark,
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Fish => write!(f, "fish"),
            Species::Shark => write!(f, "shark"),
        }
    }
}

/// Drawing-level view of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Water,
    Fish,
    Shark,
}

/// A fish and its breeding progress.
///
/// `turn` is the tick on which the fish last acted; ticks are numbered from 1,
/// so a fish that has never acted carries 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fish {
    pub breed: u32,
    pub turn: u64,
}

impl Fish {
    pub fn new(breed: u32) -> Self {
        Self { breed, turn: 0 }
    }
}

/// A shark, its breeding progress and the ticks it has left before starving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Shark {
    pub breed: u32,
    pub starve: u32,
    pub turn: u64,
}

impl Shark {
    pub fn new(breed: u32, starve: u32) -> Self {
        Self {
            breed,
            starve,
            turn: 0,
        }
    }
}

/// Cell state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Water,
    Fish(Fish),
    Shark(Shark),
}

impl Cell {
    pub fn water() -> Self {
        Cell::Water
    }

    pub fn fish(breed: u32) -> Self {
        Cell::Fish(Fish::new(breed))
    }

    pub fn shark(breed: u32, starve: u32) -> Self {
        Cell::Shark(Shark::new(breed, starve))
    }

    /// A freshly placed creature of `species` with zeroed counters
    pub fn newborn(species: Species, shark_starve: u32) -> Self {
        match species {
            Species::Fish => Cell::fish(0),
            Species::Shark => Cell::shark(0, shark_starve),
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Water => CellKind::Water,
            Cell::Fish(_) => CellKind::Fish,
            Cell::Shark(_) => CellKind::Shark,
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, Cell::Water)
    }

    pub fn is_fish(&self) -> bool {
        matches!(self, Cell::Fish(_))
    }

    pub fn is_shark(&self) -> bool {
        matches!(self, Cell::Shark(_))
    }
}
