//! Memoryless uniform generator

use super::PieceGenerator;
use crate::rng::Xorshift32;
use crate::types::{PIECE_COUNT, PieceKind};

#[derive(Debug, Clone)]
pub struct RandomGenerator {
    rng: Xorshift32,
}

impl RandomGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: Xorshift32::new(seed),
        }
    }

    fn draw(rng: &mut Xorshift32) -> PieceKind {
        PieceKind::ALL[rng.next_int(PIECE_COUNT)]
    }
}

impl PieceGenerator for RandomGenerator {
    fn next_piece(&mut self) -> PieceKind {
        Self::draw(&mut self.rng)
    }

    fn peek(&mut self, n: usize) -> Vec<PieceKind> {
        let mut lookahead = self.rng.clone();
        (0..n).map(|_| Self::draw(&mut lookahead)).collect()
    }

    fn reset(&mut self, seed: u32) {
        self.rng.seed(seed);
    }
}
