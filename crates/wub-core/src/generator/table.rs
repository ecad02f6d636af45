//! Fixed weight-table generator

use super::PieceGenerator;
use crate::config::sanitize_weight;
use crate::dist::{PieceProbability, to_piece_probabilities};
use crate::rng::Xorshift32;
use crate::sampler::sample_index;
use crate::types::{PIECE_COUNT, PieceKind};

/// Draws each piece independently from a constant weight table
///
/// Weights are in canonical piece order and need not be normalized.
/// Negative and non-finite entries count as 0; an all-zero table degrades
/// to uniform.
#[derive(Debug, Clone)]
pub struct TableGenerator {
    rng: Xorshift32,
    weights: [f32; PIECE_COUNT],
    /// Set by `next_piece`, cleared by `reset`
    drawn: bool,
}

impl TableGenerator {
    pub fn new(seed: u32, weights: [f32; PIECE_COUNT]) -> Self {
        Self {
            rng: Xorshift32::new(seed),
            weights: weights.map(sanitize_weight),
            drawn: false,
        }
    }

    /// Equal weights
    pub fn uniform(seed: u32) -> Self {
        Self::new(seed, [1.0; PIECE_COUNT])
    }

    pub fn weights(&self) -> &[f32; PIECE_COUNT] {
        &self.weights
    }

    fn draw(weights: &[f32], rng: &mut Xorshift32) -> PieceKind {
        PieceKind::ALL[sample_index(weights, rng)]
    }

    /// Normalized table, or `None` if it has no positive mass
    fn distribution(&self) -> Option<Vec<PieceProbability>> {
        let total: f32 = self.weights.iter().sum();
        if total.is_nan() || total <= 0.0 {
            return None;
        }
        let probs: Vec<f32> = self.weights.iter().map(|&w| w / total).collect();
        Some(to_piece_probabilities(&PieceKind::ALL, &probs))
    }
}

impl PieceGenerator for TableGenerator {
    fn next_piece(&mut self) -> PieceKind {
        self.drawn = true;
        Self::draw(&self.weights, &mut self.rng)
    }

    fn peek(&mut self, n: usize) -> Vec<PieceKind> {
        let mut lookahead = self.rng.clone();
        (0..n).map(|_| Self::draw(&self.weights, &mut lookahead)).collect()
    }

    fn reset(&mut self, seed: u32) {
        self.rng.seed(seed);
        self.drawn = false;
    }

    /// The normalized table once a piece has been drawn from it
    fn last_sample_distribution(&self) -> Option<Vec<PieceProbability>> {
        if !self.drawn {
            return None;
        }
        self.distribution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_weight_always_drawn() {
        let mut weights = [0.0; PIECE_COUNT];
        weights[PieceKind::T.index()] = 3.0;
        let mut generator = TableGenerator::new(21, weights);
        for _ in 0..500 {
            assert_eq!(generator.next_piece(), PieceKind::T);
        }
    }

    #[test]
    fn test_frequencies_follow_weights() {
        let weights = [4.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let mut generator = TableGenerator::new(77, weights);
        let draws = 50_000;
        let i_count = (0..draws).filter(|_| generator.next_piece() == PieceKind::I).count();
        let freq = i_count as f64 / draws as f64;
        assert!((freq - 0.4).abs() < 0.01, "freq = {freq}");
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut generator = TableGenerator::new(5, [1.0, 2.0, 3.0, 0.0, 1.0, 0.5, 0.5]);
        let preview = generator.peek(8);
        let drawn: Vec<PieceKind> = (0..8).map(|_| generator.next_piece()).collect();
        assert_eq!(preview, drawn);
    }

    #[test]
    fn test_distribution_is_normalized_table() {
        let mut generator = TableGenerator::new(1, [2.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        generator.next_piece();
        let dist = generator.last_sample_distribution().unwrap();
        assert_eq!(dist.len(), PIECE_COUNT);
        assert_eq!(dist[0].probability, 0.5);
        assert_eq!(dist[2].probability, 0.0);

        let mut empty = TableGenerator::new(1, [0.0; PIECE_COUNT]);
        empty.next_piece();
        assert!(empty.last_sample_distribution().is_none());
    }

    #[test]
    fn test_no_distribution_before_first_draw() {
        let mut generator = TableGenerator::uniform(8);
        assert!(generator.last_sample_distribution().is_none());

        generator.peek(4);
        assert!(generator.last_sample_distribution().is_none());

        generator.next_piece();
        assert!(generator.last_sample_distribution().is_some());

        generator.reset(8);
        assert!(generator.last_sample_distribution().is_none());
    }

    #[test]
    fn test_invalid_weights_count_as_zero() {
        let weights = [2.0, -1.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.0, 2.0];
        let mut generator = TableGenerator::new(30, weights);
        assert_eq!(generator.weights(), &[2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0]);

        for _ in 0..500 {
            let piece = generator.next_piece();
            assert!(matches!(piece, PieceKind::I | PieceKind::L), "drew {piece}");
        }
        let dist = generator.last_sample_distribution().unwrap();
        assert!(dist.iter().all(|p| (0.0..=1.0).contains(&p.probability)));
        assert_eq!(dist[0].probability, 0.5);
        assert_eq!(dist[6].probability, 0.5);
    }

    #[test]
    fn test_zero_table_is_uniform() {
        let mut generator = TableGenerator::new(9, [0.0; PIECE_COUNT]);
        let mut seen = [false; PIECE_COUNT];
        for _ in 0..1_000 {
            seen[generator.next_piece().index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
