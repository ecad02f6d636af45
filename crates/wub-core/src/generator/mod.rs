//! Piece generators
//!
//! All strategies share one contract ([`PieceGenerator`]); the closed set of
//! strategies is the [`Generator`] enum, which dispatches by `match` the way a
//! host holds "whatever generator is configured" without boxing.
//!
//! | strategy        | peek            | reacts to locks |
//! |-----------------|-----------------|-----------------|
//! | bag variants    | exact           | no              |
//! | random / table  | exact (cloned PRNG) | no          |
//! | model / curse   | always empty    | yes             |

mod bag;
mod factory;
mod model;
mod random;
mod table;

pub use bag::{BagGenerator, BagKind, DOUBLED_KINDS};
pub use factory::{GeneratorCtor, generator_factory};
pub use model::ModelGenerator;
pub use random::RandomGenerator;
pub use table::TableGenerator;

use crate::dist::PieceProbability;
use crate::error::InferenceError;
use crate::types::{Board, PieceKind};

/// Common generator contract
pub trait PieceGenerator {
    /// Produce the next piece, advancing internal state
    fn next_piece(&mut self) -> PieceKind;

    /// Upcoming pieces without consuming them
    ///
    /// Strategies that cannot know the future return fewer than `n` (possibly
    /// zero) entries.
    fn peek(&mut self, n: usize) -> Vec<PieceKind>;

    /// Reseed and discard every queued or staged piece
    fn reset(&mut self, seed: u32);

    /// Notification that a piece locked, leaving `board`
    ///
    /// The default ignores the board.
    fn on_lock(&mut self, board: &Board, held: Option<PieceKind>) -> Result<(), InferenceError> {
        let _ = (board, held);
        Ok(())
    }

    /// Distribution the most recent `next_piece` was drawn from, if any
    fn last_sample_distribution(&self) -> Option<Vec<PieceProbability>> {
        None
    }
}

/// Any configured generator
#[derive(Debug, Clone)]
pub enum Generator {
    Bag(BagGenerator),
    Random(RandomGenerator),
    Table(TableGenerator),
    Model(ModelGenerator),
}

impl Generator {
    /// Short strategy name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Generator::Bag(g) => g.kind().name(),
            Generator::Random(_) => "random",
            Generator::Table(_) => "table",
            Generator::Model(g) if g.is_inverted() => "curse",
            Generator::Model(_) => "model",
        }
    }
}

impl PieceGenerator for Generator {
    fn next_piece(&mut self) -> PieceKind {
        match self {
            Generator::Bag(g) => g.next_piece(),
            Generator::Random(g) => g.next_piece(),
            Generator::Table(g) => g.next_piece(),
            Generator::Model(g) => g.next_piece(),
        }
    }

    fn peek(&mut self, n: usize) -> Vec<PieceKind> {
        match self {
            Generator::Bag(g) => g.peek(n),
            Generator::Random(g) => g.peek(n),
            Generator::Table(g) => g.peek(n),
            Generator::Model(g) => g.peek(n),
        }
    }

    fn reset(&mut self, seed: u32) {
        match self {
            Generator::Bag(g) => g.reset(seed),
            Generator::Random(g) => g.reset(seed),
            Generator::Table(g) => g.reset(seed),
            Generator::Model(g) => g.reset(seed),
        }
    }

    fn on_lock(&mut self, board: &Board, held: Option<PieceKind>) -> Result<(), InferenceError> {
        match self {
            Generator::Bag(g) => g.on_lock(board, held),
            Generator::Random(g) => g.on_lock(board, held),
            Generator::Table(g) => g.on_lock(board, held),
            Generator::Model(g) => g.on_lock(board, held),
        }
    }

    fn last_sample_distribution(&self) -> Option<Vec<PieceProbability>> {
        match self {
            Generator::Bag(g) => g.last_sample_distribution(),
            Generator::Random(g) => g.last_sample_distribution(),
            Generator::Table(g) => g.last_sample_distribution(),
            Generator::Model(g) => g.last_sample_distribution(),
        }
    }
}

impl From<BagGenerator> for Generator {
    fn from(g: BagGenerator) -> Self {
        Generator::Bag(g)
    }
}

impl From<RandomGenerator> for Generator {
    fn from(g: RandomGenerator) -> Self {
        Generator::Random(g)
    }
}

impl From<TableGenerator> for Generator {
    fn from(g: TableGenerator) -> Self {
        Generator::Table(g)
    }
}

impl From<ModelGenerator> for Generator {
    fn from(g: ModelGenerator) -> Self {
        Generator::Model(g)
    }
}
