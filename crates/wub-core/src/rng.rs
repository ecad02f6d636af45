//! 32-bit xorshift PRNG
//!
//! Every generator draws from this PRNG so that a game is reproducible from
//! its seed. Bounded draws take the output modulo the bound;
//! the resulting modulo bias for non-power-of-two bounds is a known, accepted
//! approximation and must not be changed without breaking seed compatibility.

use rand::{RngCore, SeedableRng};

/// State used when seeded with 0 (zero is absorbing for xorshift)
pub const ZERO_SEED_FALLBACK: u32 = 0x9E37_79B9;

/// Xorshift32 (13, 17, 5)
///
/// `Clone` yields an independent generator with identical state, which is
/// how previews are computed without disturbing the real draw sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    pub fn new(seed: u32) -> Self {
        let mut rng = Self {
            state: ZERO_SEED_FALLBACK,
        };
        rng.seed(seed);
        rng
    }

    /// Reseed in place
    pub fn seed(&mut self, value: u32) {
        self.state = if value == 0 { ZERO_SEED_FALLBACK } else { value };
    }

    /// Current state word (never 0)
    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform-ish integer in `[0, bound)`; returns 0 when `bound == 0`
    #[inline]
    pub fn next_int(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next_u32() as u64 % bound as u64) as usize
    }
}

impl RngCore for Xorshift32 {
    fn next_u32(&mut self) -> u32 {
        Xorshift32::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let lo = Xorshift32::next_u32(self) as u64;
        let hi = Xorshift32::next_u32(self) as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = Xorshift32::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for Xorshift32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Xorshift32::new(u32::from_le_bytes(seed))
    }
}
