//! Float32 layer kernels
//!
//! All arithmetic stays in `f32` so results match the exported weights'
//! precision. Tensors are row-major: feature maps are `[channels, rows, cols]`,
//! convolution weights `[out, in, 3, 3]`, linear weights `[out, in]`.

/// Convolution kernel side
pub const KERNEL: usize = 3;

/// Product of `dims`, `None` if it overflows `usize`
pub fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

// =============================================================================
// Convolution
// =============================================================================

/// 3×3, stride 1, zero-padded ("same") convolution fused with ReLU
///
/// Output spatial size equals input spatial size.
///
/// # Panics
///
/// If `input`, `weight` or `bias` are shorter than the given dimensions
/// imply; callers validate parameter sizes first.
pub fn conv3x3_relu(
    input: &[f32],
    in_channels: usize,
    rows: usize,
    cols: usize,
    weight: &[f32],
    bias: &[f32],
    out_channels: usize,
) -> Vec<f32> {
    let plane = rows * cols;
    let mut out = vec![0.0f32; out_channels * plane];

    for oc in 0..out_channels {
        let out_plane = &mut out[oc * plane..(oc + 1) * plane];
        for r in 0..rows {
            for c in 0..cols {
                let mut acc = bias[oc];
                for ic in 0..in_channels {
                    let in_plane = &input[ic * plane..(ic + 1) * plane];
                    let w = &weight[(oc * in_channels + ic) * KERNEL * KERNEL..][..KERNEL * KERNEL];
                    for kr in 0..KERNEL {
                        // row offset -1..=1
                        let Some(ir) = (r + kr).checked_sub(1).filter(|&ir| ir < rows) else {
                            continue;
                        };
                        for kc in 0..KERNEL {
                            let Some(icol) = (c + kc).checked_sub(1).filter(|&x| x < cols) else {
                                continue;
                            };
                            acc += w[kr * KERNEL + kc] * in_plane[ir * cols + icol];
                        }
                    }
                }
                out_plane[r * cols + c] = acc.max(0.0);
            }
        }
    }

    out
}

// =============================================================================
// Pooling
// =============================================================================

/// Global average pool: one mean per channel
pub fn global_avg_pool(input: &[f32], channels: usize, rows: usize, cols: usize) -> Vec<f32> {
    let plane = rows * cols;
    if plane == 0 {
        return vec![0.0; channels];
    }
    let denom = plane as f32;
    (0..channels)
        .map(|ch| input[ch * plane..(ch + 1) * plane].iter().sum::<f32>() / denom)
        .collect()
}

// =============================================================================
// Linear
// =============================================================================

/// `weight · input + bias` with `weight` as `[out_features, input.len()]`
pub fn linear(input: &[f32], weight: &[f32], bias: &[f32], out_features: usize) -> Vec<f32> {
    let in_features = input.len();
    (0..out_features)
        .map(|o| {
            let row = &weight[o * in_features..(o + 1) * in_features];
            row.iter().zip(input.iter()).fold(bias[o], |acc, (&w, &x)| acc + w * x)
        })
        .collect()
}

/// In-place ReLU
#[inline]
pub fn relu(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = v.max(0.0);
    }
}
