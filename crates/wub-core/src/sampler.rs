//! Weighted index sampling

use crate::rng::Xorshift32;

/// 2^32, maps a `u32` draw into `[0, 1)`
const U32_RANGE: f64 = 4_294_967_296.0;

/// Pick an index with probability proportional to `weights[i]`
///
/// Weights need not be normalized. A non-positive total falls back to a
/// uniform index via `next_int`. Otherwise exactly one `u32` is drawn, scaled
/// into `[0, total)`, and the first index whose running sum reaches the draw is
/// returned (the last index if rounding exhausts the scan).
///
/// Returns 0 for an empty slice without touching the PRNG.
pub fn sample_index(weights: &[f32], rng: &mut Xorshift32) -> usize {
    if weights.is_empty() {
        return 0;
    }

    let total: f64 = weights.iter().map(|&w| w as f64).sum();
    if total.is_nan() || total <= 0.0 {
        return rng.next_int(weights.len());
    }

    let draw = rng.next_u32() as f64 / U32_RANGE * total;
    let mut cumulative = 0.0f64;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w as f64;
        if cumulative >= draw {
            return i;
        }
    }

    weights.len() - 1
}
