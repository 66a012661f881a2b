//! Deterministic random streams.
//!
//! Every draw the simulation makes comes from a ChaCha stream derived from the
//! run seed. Placement has its own stream; each `(tick, row)` pair gets another,
//! so the draws a row sees do not depend on which worker scans it.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Stream id reserved for entity placement. Ticks are numbered from 1.
const PLACEMENT_STREAM: u64 = 0;

/// Bits of word offset given to each row within a tick's stream
const ROW_WORD_SHIFT: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomStreams {
    seed: u64,
}

impl RandomStreams {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generator used to seed the initial populations
    pub fn placement(&self) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(PLACEMENT_STREAM);
        rng
    }

    /// Generator for the direction draws of one row during one tick
    pub fn row(&self, tick: u64, row: usize) -> ChaCha8Rng {
        debug_assert!(tick != PLACEMENT_STREAM, "ticks are numbered from 1");
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(tick);
        rng.set_word_pos((row as u128) << ROW_WORD_SHIFT);
        rng
    }
}
