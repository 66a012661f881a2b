//! 2D toroidal ocean grid.

use serde::{Deserialize, Serialize};
use std::slice::ChunksMut;
use wator_core::{Cell, CellKind, Census, Direction, OceanConfig, Position};

/// Read/write access to cells by wrapped position.
///
/// Implemented by the whole [`Grid`] and by the row windows the scheduler
/// hands to its workers, so the cell rules run unchanged on either.
pub trait CellAccess {
    fn width(&self) -> i32;

    fn height(&self) -> i32;

    /// Cell at a position already wrapped into range
    fn cell(&self, pos: Position) -> Cell;

    fn set_cell(&mut self, pos: Position, cell: Cell);

    /// Wrapped neighbor of `pos`
    fn neighbor(&self, pos: Position, direction: Direction) -> Position {
        pos.step(direction).wrap(self.width(), self.height())
    }
}

/// A 2D toroidal grid of cells, stored row-major.
///
/// Dimensions are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// An ocean of water. Panics on non-positive dimensions.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(
            width > 0 && height > 0,
            "grid dimensions must be positive, got {}x{}",
            width,
            height
        );
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::Water; size],
        }
    }

    /// Create an all-water grid from ocean configuration
    pub fn from_config(config: &OceanConfig) -> Self {
        Self::new(config.width, config.height)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get cell at position (with toroidal wrapping)
    pub fn get(&self, pos: Position) -> &Cell {
        let index = self.pos_to_index(pos.wrap(self.width, self.height));
        &self.cells[index]
    }

    /// Get mutable cell at position
    pub fn get_mut(&mut self, pos: Position) -> &mut Cell {
        let index = self.pos_to_index(pos.wrap(self.width, self.height));
        &mut self.cells[index]
    }

    /// Set cell at position
    pub fn set(&mut self, pos: Position, cell: Cell) {
        *self.get_mut(pos) = cell;
    }

    /// Wrapped neighbor of a position
    pub fn neighbor(&self, pos: Position, direction: Direction) -> Position {
        pos.step(direction).wrap(self.width, self.height)
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        row_major_index(self.width, pos)
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        row_major_position(self.width, index)
    }

    /// Iterator over all positions
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), cell))
    }

    /// Drawing view: every position with the kind of its cell
    pub fn kinds(&self) -> impl Iterator<Item = (Position, CellKind)> + '_ {
        self.iter().map(|(pos, cell)| (pos, cell.kind()))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Positions currently holding water
    pub fn water_positions(&self) -> Vec<Position> {
        self.iter()
            .filter(|(_, cell)| cell.is_water())
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn census(&self) -> Census {
        Census::from_cells(&self.cells)
    }

    /// Forget which tick each creature last acted on, so all of them act on
    /// the next tick of whichever simulation owns the grid
    pub fn reset_turns(&mut self) {
        for cell in &mut self.cells {
            match cell {
                Cell::Fish(fish) => fish.turn = 0,
                Cell::Shark(shark) => shark.turn = 0,
                Cell::Water => {}
            }
        }
    }

    /// Disjoint mutable rows, top to bottom
    pub(crate) fn rows_mut(&mut self) -> ChunksMut<'_, Cell> {
        self.cells.chunks_mut(self.width as usize)
    }
}

// Indices are computed in usize; only each coordinate has to fit in i32
fn row_major_index(width: i32, pos: Position) -> usize {
    pos.y as usize * width as usize + pos.x as usize
}

fn row_major_position(width: i32, index: usize) -> Position {
    let width = width as usize;
    Position::new((index % width) as i32, (index / width) as i32)
}

impl CellAccess for Grid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn cell(&self, pos: Position) -> Cell {
        *self.get(pos)
    }

    fn set_cell(&mut self, pos: Position, cell: Cell) {
        self.set(pos, cell);
    }
}
