//! Model-backed generator
//!
//! ```text
//!            on_lock (model present, inference ok)
//!  ┌────────────┐ ───────────────────────────────▶ ┌─────────┐
//!  │ no pending │                                  │ pending │
//!  └────────────┘ ◀─────────────────────────────── └─────────┘
//!     ▲      │          next_piece (returns staged piece)
//!     └──────┘
//!  next_piece: uniform fallback over the model's pieces (or the canonical set)
//!  on_lock with no model / failed inference: pending cleared
//! ```
//!
//! The model is read from a shared [`ModelSlot`] at every lock, so a
//! background load swaps in a new model without the generator noticing.

use super::PieceGenerator;
use crate::config::InferenceConfig;
use crate::dist::PieceProbability;
use crate::error::InferenceError;
use crate::infer::predict_distribution;
use crate::model::ModelSlot;
use crate::rng::Xorshift32;
use crate::sampler::sample_index;
use crate::types::{Board, PieceKind};
use log::{debug, warn};

/// Piece chosen at lock time together with the distribution it came from
#[derive(Debug, Clone, PartialEq)]
struct Pending {
    piece: PieceKind,
    distribution: Vec<PieceProbability>,
}

#[derive(Debug, Clone)]
pub struct ModelGenerator {
    rng: Xorshift32,
    slot: ModelSlot,
    config: InferenceConfig,
    /// Replace the configured strategy with distribution inversion
    inverted: bool,
    pending: Option<Pending>,
    last: Option<Vec<PieceProbability>>,
}

impl ModelGenerator {
    pub fn new(seed: u32, slot: ModelSlot, config: InferenceConfig) -> Self {
        Self {
            rng: Xorshift32::new(seed),
            slot,
            config,
            inverted: false,
            pending: None,
            last: None,
        }
    }

    /// Inverted variant: favors pieces the model considers unlikely
    pub fn curse(seed: u32, slot: ModelSlot, config: InferenceConfig) -> Self {
        Self {
            inverted: true,
            ..Self::new(seed, slot, config)
        }
    }

    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    #[inline]
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Piece staged by the last lock, if not yet consumed
    pub fn pending_piece(&self) -> Option<PieceKind> {
        self.pending.as_ref().map(|p| p.piece)
    }

    /// Handle to the model cell this generator reads
    pub fn slot(&self) -> &ModelSlot {
        &self.slot
    }

    fn fallback_piece(&mut self) -> PieceKind {
        match self.slot.current() {
            Some(model) if !model.pieces().is_empty() => {
                let pieces = model.pieces();
                pieces[self.rng.next_int(pieces.len())]
            }
            _ => PieceKind::ALL[self.rng.next_int(PieceKind::ALL.len())],
        }
    }
}

impl PieceGenerator for ModelGenerator {
    fn next_piece(&mut self) -> PieceKind {
        match self.pending.take() {
            Some(Pending {
                piece,
                distribution,
            }) => {
                self.last = Some(distribution);
                piece
            }
            None => {
                self.last = None;
                self.fallback_piece()
            }
        }
    }

    /// Always empty: the next piece depends on a lock that has not happened
    fn peek(&mut self, _n: usize) -> Vec<PieceKind> {
        Vec::new()
    }

    fn reset(&mut self, seed: u32) {
        self.rng.seed(seed);
        self.pending = None;
        self.last = None;
    }

    fn on_lock(&mut self, board: &Board, held: Option<PieceKind>) -> Result<(), InferenceError> {
        let Some(model) = self.slot.current() else {
            self.pending = None;
            return Ok(());
        };

        let distribution =
            match predict_distribution(&model, board, held, &self.config, self.inverted) {
                Ok(d) => d,
                Err(e) => {
                    warn!("inference failed, falling back to uniform: {e}");
                    self.pending = None;
                    return Err(e);
                }
            };

        let weights: Vec<f32> = distribution.iter().map(|p| p.probability).collect();
        let index = sample_index(&weights, &mut self.rng);
        let piece = distribution
            .get(index)
            .map_or(PieceKind::ALL[index % PieceKind::ALL.len()], |p| p.piece);
        debug!("staged {piece} (p={:.3})", weights.get(index).copied().unwrap_or(0.0));

        self.pending = Some(Pending {
            piece,
            distribution,
        });
        Ok(())
    }

    fn last_sample_distribution(&self) -> Option<Vec<PieceProbability>> {
        self.last.clone()
    }
}
