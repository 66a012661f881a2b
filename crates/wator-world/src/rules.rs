//! Cell state machine: how fish and sharks move, eat, breed and starve.
//!
//! Rules are applied to one coordinate at a time. Only the cell itself and
//! its four neighbors are read or written.

use crate::grid::CellAccess;
use rand::Rng;
use serde::{Deserialize, Serialize};
use wator_core::{Cell, CellKind, Direction, Fish, PopulationConfig, Position, Shark, TickEvents};

/// Life-cycle thresholds shared by every cell for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub fish_breed: u32,
    pub shark_breed: u32,
    pub shark_starve: u32,
}

/// What happened when a cell was evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Water, or a creature that already acted this tick
    Idle,
    /// Moved into water
    Moved { to: Position, bred: bool },
    /// Chosen neighbor was occupied
    Blocked,
    /// Shark moved onto a fish
    Ate { at: Position, bred: bool },
    /// Shark ran out of ticks and became water
    Starved,
}

impl Rules {
    pub fn new(fish_breed: u32, shark_breed: u32, shark_starve: u32) -> Self {
        Self {
            fish_breed,
            shark_breed,
            shark_starve,
        }
    }

    pub fn from_config(config: &PopulationConfig) -> Self {
        Self::new(config.fish_breed, config.shark_breed, config.shark_starve)
    }

    /// Evaluate every cell of row `y`, left to right
    pub fn evaluate_row<A, R>(
        &self,
        grid: &mut A,
        y: i32,
        tick: u64,
        rng: &mut R,
    ) -> TickEvents
    where
        A: CellAccess + ?Sized,
        R: Rng + ?Sized,
    {
        let mut events = TickEvents::new();
        for x in 0..grid.width() {
            let pos = Position::new(x, y);
            let kind = grid.cell(pos).kind();
            let outcome = self.evaluate(grid, pos, tick, rng);
            record(&mut events, kind, outcome);
        }
        events
    }

    /// Apply one transition to the cell at `pos` (already wrapped).
    ///
    /// A creature whose `turn` equals `tick` has acted already and is left alone.
    pub fn evaluate<A, R>(
        &self,
        grid: &mut A,
        pos: Position,
        tick: u64,
        rng: &mut R,
    ) -> Outcome
    where
        A: CellAccess + ?Sized,
        R: Rng + ?Sized,
    {
        match grid.cell(pos) {
            Cell::Fish(fish) if fish.turn < tick => self.fish_turn(grid, pos, fish, tick, rng),
            Cell::Shark(shark) if shark.turn < tick => {
                self.shark_turn(grid, pos, shark, tick, rng)
            }
            _ => Outcome::Idle,
        }
    }

    fn fish_turn<A, R>(
        &self,
        grid: &mut A,
        pos: Position,
        mut fish: Fish,
        tick: u64,
        rng: &mut R,
    ) -> Outcome
    where
        A: CellAccess + ?Sized,
        R: Rng + ?Sized,
    {
        fish.turn = tick;
        fish.breed += 1;
        let ready = fish.breed >= self.fish_breed;
        if ready {
            fish.breed = 0;
        }

        let target = grid.neighbor(pos, Direction::random(rng));
        if !grid.cell(target).is_water() {
            // No room for offspring either
            grid.set_cell(pos, Cell::Fish(fish));
            return Outcome::Blocked;
        }

        let left_behind = if ready {
            Cell::Fish(Fish { breed: 0, turn: tick })
        } else {
            Cell::Water
        };
        grid.set_cell(pos, left_behind);
        grid.set_cell(target, Cell::Fish(fish));
        Outcome::Moved {
            to: target,
            bred: ready,
        }
    }

    fn shark_turn<A, R>(
        &self,
        grid: &mut A,
        pos: Position,
        mut shark: Shark,
        tick: u64,
        rng: &mut R,
    ) -> Outcome
    where
        A: CellAccess + ?Sized,
        R: Rng + ?Sized,
    {
        if shark.starve == 0 {
            grid.set_cell(pos, Cell::Water);
            return Outcome::Starved;
        }

        shark.turn = tick;
        shark.breed += 1;
        let ready = shark.breed >= self.shark_breed;
        if ready {
            shark.breed = 0;
        }

        let prey = Direction::PREY_SCAN
            .iter()
            .map(|&direction| grid.neighbor(pos, direction))
            .find(|&neighbor| grid.cell(neighbor).is_fish());

        let target = match prey {
            Some(at) => {
                shark.starve = self.shark_starve;
                at
            }
            None => {
                shark.starve -= 1;
                let target = grid.neighbor(pos, Direction::random(rng));
                if !grid.cell(target).is_water() {
                    // A boxed-in shark at the threshold becomes a fresh parent in place
                    if ready {
                        shark.starve = self.shark_starve;
                    }
                    grid.set_cell(pos, Cell::Shark(shark));
                    return Outcome::Blocked;
                }
                target
            }
        };

        let left_behind = if ready {
            Cell::Shark(Shark {
                breed: 0,
                starve: self.shark_starve,
                turn: tick,
            })
        } else {
            Cell::Water
        };
        grid.set_cell(pos, left_behind);
        grid.set_cell(target, Cell::Shark(shark));

        match prey {
            Some(at) => Outcome::Ate { at, bred: ready },
            None => Outcome::Moved {
                to: target,
                bred: ready,
            },
        }
    }
}

fn record(events: &mut TickEvents, kind: CellKind, outcome: Outcome) {
    match (kind, outcome) {
        (CellKind::Fish, Outcome::Moved { bred: true, .. }) => events.fish_born += 1,
        (CellKind::Shark, Outcome::Moved { bred: true, .. }) => events.sharks_born += 1,
        (_, Outcome::Ate { bred, .. }) => {
            events.fish_eaten += 1;
            events.sharks_born += bred as u64;
        }
        (_, Outcome::Starved) => events.sharks_starved += 1,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rules() -> Rules {
        Rules::new(3, 5, 4)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    fn neighbors(pos: Position) -> Vec<Position> {
        Direction::all()
            .iter()
            .map(|&d| pos.step(d).wrap(10, 10))
            .collect()
    }

    #[test]
    fn test_fish_moves_into_water() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(5, 5);
        grid.set(origin, Cell::fish(0));

        let outcome = rules().evaluate(&mut grid, origin, 1, &mut rng());
        let Outcome::Moved { to, bred } = outcome else {
            panic!("expected a move, got {:?}", outcome);
        };
        assert!(!bred);
        assert!(neighbors(origin).contains(&to));
        assert_eq!(*grid.get(origin), Cell::Water);
        assert_eq!(*grid.get(to), Cell::Fish(Fish { breed: 1, turn: 1 }));
        assert_eq!(grid.census().fish, 1);
    }

    #[test]
    fn test_fish_breeds_leaving_offspring_behind() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(5, 5);
        grid.set(origin, Cell::fish(2));

        let outcome = rules().evaluate(&mut grid, origin, 1, &mut rng());
        let Outcome::Moved { to, bred } = outcome else {
            panic!("expected a move, got {:?}", outcome);
        };
        assert!(bred);
        assert_eq!(*grid.get(origin), Cell::Fish(Fish { breed: 0, turn: 1 }));
        assert_eq!(*grid.get(to), Cell::Fish(Fish { breed: 0, turn: 1 }));
    }

    #[test]
    fn test_boxed_in_fish_still_ages_and_cannot_breed() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(5, 5);
        grid.set(origin, Cell::fish(0));
        for pos in neighbors(origin) {
            grid.set(pos, Cell::fish(0));
        }

        let outcome = rules().evaluate(&mut grid, origin, 1, &mut rng());
        assert_eq!(outcome, Outcome::Blocked);
        assert_eq!(*grid.get(origin), Cell::Fish(Fish { breed: 1, turn: 1 }));

        // Reaching the threshold without room resets the counter, no offspring
        grid.set(origin, Cell::fish(2));
        rules().evaluate(&mut grid, origin, 2, &mut rng());
        assert_eq!(*grid.get(origin), Cell::Fish(Fish { breed: 0, turn: 2 }));
        assert_eq!(grid.census().fish, 5);
    }

    #[test]
    fn test_creature_acts_once_per_tick() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(5, 5);
        grid.set(origin, Cell::fish(0));

        let Outcome::Moved { to, .. } = rules().evaluate(&mut grid, origin, 1, &mut rng()) else {
            panic!("expected a move");
        };
        assert_eq!(rules().evaluate(&mut grid, to, 1, &mut rng()), Outcome::Idle);
        assert_eq!(*grid.get(to), Cell::Fish(Fish { breed: 1, turn: 1 }));

        // Next tick it acts again
        assert_ne!(rules().evaluate(&mut grid, to, 2, &mut rng()), Outcome::Idle);
    }

    #[test]
    fn test_water_is_passive() {
        let mut grid = Grid::new(10, 10);
        let before = grid.clone();
        let outcome = rules().evaluate(&mut grid, Position::new(3, 3), 1, &mut rng());
        assert_eq!(outcome, Outcome::Idle);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_shark_eats_in_priority_order() {
        let origin = Position::new(5, 5);
        use Direction::*;
        let cases = [
            (vec![North, South, West, East], East),
            (vec![North, South, West], West),
            (vec![North, South], South),
            (vec![North], North),
        ];

        for (fish_at, expected) in cases {
            let mut grid = Grid::new(10, 10);
            grid.set(origin, Cell::shark(0, 2));
            for direction in &fish_at {
                grid.set(origin.step(*direction), Cell::fish(0));
            }

            let outcome = rules().evaluate(&mut grid, origin, 1, &mut rng());
            let prey = origin.step(expected);
            assert_eq!(outcome, Outcome::Ate { at: prey, bred: false });
            assert_eq!(
                *grid.get(prey),
                Cell::Shark(Shark {
                    breed: 1,
                    starve: 4,
                    turn: 1
                })
            );
            assert_eq!(*grid.get(origin), Cell::Water);
            assert_eq!(grid.census().fish, fish_at.len() - 1);
        }
    }

    #[test]
    fn test_shark_hunts_across_the_edge() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(9, 0);
        grid.set(origin, Cell::shark(0, 1));
        grid.set(Position::new(0, 0), Cell::fish(0));

        let outcome = rules().evaluate(&mut grid, origin, 1, &mut rng());
        assert_eq!(
            outcome,
            Outcome::Ate {
                at: Position::new(0, 0),
                bred: false
            }
        );
    }

    #[test]
    fn test_shark_without_prey_moves_and_gets_hungrier() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(5, 5);
        grid.set(origin, Cell::shark(1, 3));

        let Outcome::Moved { to, bred } = rules().evaluate(&mut grid, origin, 1, &mut rng()) else {
            panic!("expected a move");
        };
        assert!(!bred);
        assert_eq!(*grid.get(origin), Cell::Water);
        assert_eq!(
            *grid.get(to),
            Cell::Shark(Shark {
                breed: 2,
                starve: 2,
                turn: 1
            })
        );
    }

    #[test]
    fn test_blocked_shark_still_starves() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(5, 5);
        grid.set(origin, Cell::shark(0, 3));
        for pos in neighbors(origin) {
            grid.set(pos, Cell::shark(0, 3));
        }

        let outcome = rules().evaluate(&mut grid, origin, 1, &mut rng());
        assert_eq!(outcome, Outcome::Blocked);
        assert_eq!(
            *grid.get(origin),
            Cell::Shark(Shark {
                breed: 1,
                starve: 2,
                turn: 1
            })
        );
    }

    #[test]
    fn test_boxed_in_shark_at_threshold_renews_itself() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(5, 5);
        grid.set(origin, Cell::shark(4, 2));
        for pos in neighbors(origin) {
            grid.set(pos, Cell::shark(0, 3));
        }

        let outcome = rules().evaluate(&mut grid, origin, 1, &mut rng());
        assert_eq!(outcome, Outcome::Blocked);
        assert_eq!(
            *grid.get(origin),
            Cell::Shark(Shark {
                breed: 0,
                starve: 4,
                turn: 1
            })
        );
        assert_eq!(grid.census().sharks, 5);
    }

    #[test]
    fn test_shark_breeds_on_a_plain_move() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(5, 5);
        grid.set(origin, Cell::shark(4, 3));

        let outcome = rules().evaluate(&mut grid, origin, 1, &mut rng());
        let Outcome::Moved { to, bred } = outcome else {
            panic!("expected a move, got {:?}", outcome);
        };
        assert!(bred);
        // Offspring starts full, the parent keeps its hunger
        assert_eq!(
            *grid.get(origin),
            Cell::Shark(Shark {
                breed: 0,
                starve: 4,
                turn: 1
            })
        );
        assert_eq!(
            *grid.get(to),
            Cell::Shark(Shark {
                breed: 0,
                starve: 2,
                turn: 1
            })
        );

        let mut events = TickEvents::new();
        record(&mut events, CellKind::Shark, outcome);
        assert_eq!(events.sharks_born, 1);
    }

    #[test]
    fn test_starved_shark_becomes_water() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(0, 0);
        grid.set(origin, Cell::shark(3, 0));
        // Even with a fish next to it
        grid.set(Position::new(1, 0), Cell::fish(0));

        let outcome = rules().evaluate(&mut grid, origin, 1, &mut rng());
        assert_eq!(outcome, Outcome::Starved);
        assert_eq!(*grid.get(origin), Cell::Water);
        assert_eq!(*grid.get(Position::new(1, 0)), Cell::fish(0));
    }

    #[test]
    fn test_last_meal_tick_runs_out() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(5, 5);
        grid.set(origin, Cell::shark(0, 1));

        let Outcome::Moved { to, .. } = rules().evaluate(&mut grid, origin, 1, &mut rng()) else {
            panic!("expected a move");
        };
        assert!(matches!(*grid.get(to), Cell::Shark(Shark { starve: 0, .. })));
        assert_eq!(rules().evaluate(&mut grid, to, 2, &mut rng()), Outcome::Starved);
        assert_eq!(grid.census().sharks, 0);
    }

    #[test]
    fn test_shark_breeds_after_eating() {
        let mut grid = Grid::new(10, 10);
        let origin = Position::new(5, 5);
        grid.set(origin, Cell::shark(4, 2));
        grid.set(Position::new(6, 5), Cell::fish(0));

        let outcome = rules().evaluate(&mut grid, origin, 1, &mut rng());
        assert_eq!(
            outcome,
            Outcome::Ate {
                at: Position::new(6, 5),
                bred: true
            }
        );
        let fresh = Cell::Shark(Shark {
            breed: 0,
            starve: 4,
            turn: 1,
        });
        assert_eq!(*grid.get(origin), fresh);
        assert_eq!(*grid.get(Position::new(6, 5)), fresh);
    }

    #[test]
    fn test_row_events() {
        let mut grid = Grid::new(10, 10);
        grid.set(Position::new(0, 4), Cell::shark(0, 0));
        grid.set(Position::new(3, 4), Cell::shark(0, 3));
        grid.set(Position::new(4, 4), Cell::fish(0));

        grid.set(Position::new(7, 4), Cell::fish(2));

        let events = rules().evaluate_row(&mut grid, 4, 1, &mut rng());
        assert_eq!(events.sharks_starved, 1);
        assert_eq!(events.fish_born, 1);
        assert_eq!(events.fish_eaten, 1);
        assert_eq!(grid.census().sharks, 1);
        assert_eq!(grid.census().fish, 2);
    }
}
