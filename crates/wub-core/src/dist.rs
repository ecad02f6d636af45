//! Probability distribution shaping
//!
//! Every stage here returns non-negative entries summing to 1 whenever that is
//! possible, and substitutes the uniform distribution instead of dividing by a
//! non-positive total.
//!
//! ```text
//! logits ─ /temperature ─ softmax ─┬─ clean_uniform: blend toward uniform on tidy boards
//!                                  ├─ threshold:     drop entries below an absolute floor
//!                                  └─ (curse)        invert: 1 - p, renormalize
//! ```

use crate::types::{Board, PieceKind};
use serde::{Deserialize, Serialize};

/// Minimum cleanliness score for the clean-board blend
pub const CLEAN_SCORE_MIN: f32 = 0.98;

/// Maximum stack height for the clean-board blend
pub const CLEAN_HEIGHT_MAX: usize = 4;

/// Weight of the uniform distribution in the clean-board blend
pub const CLEAN_BLEND: f32 = 0.2;

/// One entry of a distribution aligned with the model's piece order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceProbability {
    pub piece: PieceKind,
    pub probability: f32,
}

/// Pair probabilities with pieces (truncates to the shorter list)
pub fn to_piece_probabilities(pieces: &[PieceKind], probs: &[f32]) -> Vec<PieceProbability> {
    pieces
        .iter()
        .zip(probs.iter())
        .map(|(&piece, &probability)| PieceProbability { piece, probability })
        .collect()
}

/// Uniform distribution of length `n`
pub fn uniform(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f32; n]
}

/// Scale `values` to sum to 1, or `None` if the total is not positive
fn normalized(values: &[f32]) -> Option<Vec<f32>> {
    let total: f32 = values.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return None;
    }
    Some(values.iter().map(|&v| v / total).collect())
}

// =============================================================================
// Softmax
// =============================================================================

/// Numerically stable softmax
///
/// Subtracts the maximum before exponentiating; an exponentiated sum of
/// exactly zero yields the uniform distribution.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    if sum == 0.0 || !sum.is_finite() {
        return uniform(logits.len());
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Softmax of `logits / temperature`; a non-positive temperature counts as 1
pub fn softmax_with_temperature(logits: &[f32], temperature: f32) -> Vec<f32> {
    let t = if temperature > 0.0 { temperature } else { 1.0 };
    let scaled: Vec<f32> = logits.iter().map(|&x| x / t).collect();
    softmax(&scaled)
}

// =============================================================================
// Threshold
// =============================================================================

/// Zero entries below `threshold` and renormalize the survivors
///
/// If nothing survives the input is returned unchanged.
pub fn apply_threshold(probs: &[f32], threshold: f32) -> Vec<f32> {
    let filtered: Vec<f32> = probs
        .iter()
        .map(|&p| if p < threshold { 0.0 } else { p })
        .collect();
    normalized(&filtered).unwrap_or_else(|| probs.to_vec())
}

// =============================================================================
// Clean-board blend
// =============================================================================

/// Board statistics used by the clean-board heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardStats {
    /// Filled cells
    pub filled: usize,
    /// Empty cells with a filled cell somewhere above in the same column
    pub holes: usize,
    /// Rows from the topmost filled row to the bottom (0 for an empty board)
    pub height: usize,
}

impl BoardStats {
    pub fn of(board: &Board) -> Self {
        let mut stats = BoardStats::default();
        let mut top_row: Option<usize> = None;

        for col in 0..board.cols() {
            let mut filled_seen = false;
            for row in 0..board.rows() {
                if board.is_filled(row, col) {
                    filled_seen = true;
                    stats.filled += 1;
                    top_row = Some(top_row.map_or(row, |t| t.min(row)));
                } else if filled_seen {
                    stats.holes += 1;
                }
            }
        }

        stats.height = top_row.map_or(0, |t| board.rows() - t);
        stats
    }

    /// `1 - holes / max(1, filled)`, or 1 for an empty board
    pub fn cleanliness(&self) -> f32 {
        if self.filled == 0 {
            return 1.0;
        }
        1.0 - self.holes as f32 / self.filled.max(1) as f32
    }
}

/// Uniform blend weight for this board: [`CLEAN_BLEND`] on tidy, low stacks, else 0
pub fn clean_blend_factor(board: &Board) -> f32 {
    let stats = BoardStats::of(board);
    if stats.cleanliness() >= CLEAN_SCORE_MIN && stats.height <= CLEAN_HEIGHT_MAX {
        CLEAN_BLEND
    } else {
        0.0
    }
}

/// `p' = p * (1 - blend) + uniform * blend` using [`clean_blend_factor`]
pub fn blend_clean_uniform(probs: &[f32], board: &Board) -> Vec<f32> {
    let blend = clean_blend_factor(board);
    if blend <= 0.0 || probs.is_empty() {
        return probs.to_vec();
    }
    let u = 1.0 / probs.len() as f32;
    probs.iter().map(|&p| p * (1.0 - blend) + u * blend).collect()
}

// =============================================================================
// Inversion
// =============================================================================

/// `p'_i = max(0, 1 - p_i)`, renormalized; uniform if that sums to zero
pub fn invert(probs: &[f32]) -> Vec<f32> {
    let flipped: Vec<f32> = probs.iter().map(|&p| (1.0 - p).max(0.0)).collect();
    normalized(&flipped).unwrap_or_else(|| uniform(probs.len()))
}
