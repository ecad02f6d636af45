//! Forward pass: board → logits → shaped distribution
//!
//! ```text
//! Board ─ planes [C_in, R, C]
//!       ─ conv.0 (3x3) + ReLU ─ conv.2 + ReLU ─ ... ─ [C_last, R, C]
//!       ─ global average pool [C_last]
//!       ─ ⊕ hold one-hot [extra_features]
//!       ─ mlp.0 + ReLU [hidden] ─ mlp.2 [num_outputs]
//! ```
//!
//! Convolution layer `i` is stored under index `2 * i` because the exporter
//! serializes the activations of its sequential container at odd indices.

use super::input::{build_input, hold_features};
use super::layers::{KERNEL, conv3x3_relu, element_count, global_avg_pool, linear, relu};
use crate::config::{InferenceConfig, InferenceStrategy};
use crate::dist::{
    PieceProbability, apply_threshold, blend_clean_uniform, invert, softmax_with_temperature,
    to_piece_probabilities,
};
use crate::error::{InferenceError, InferenceResult};
use crate::model::LoadedModel;
use crate::types::{Board, PieceKind};

/// First MLP layer
pub const MLP_HIDDEN_WEIGHT: &str = "mlp.0.weight";
pub const MLP_HIDDEN_BIAS: &str = "mlp.0.bias";
/// Output MLP layer
pub const MLP_OUT_WEIGHT: &str = "mlp.2.weight";
pub const MLP_OUT_BIAS: &str = "mlp.2.bias";

/// Weight name of convolution layer `layer`
pub fn conv_weight_name(layer: usize) -> String {
    format!("conv.{}.weight", layer * 2)
}

/// Bias name of convolution layer `layer`
pub fn conv_bias_name(layer: usize) -> String {
    format!("conv.{}.bias", layer * 2)
}

/// Look up a parameter and check its element count against `dims`
///
/// A `dims` product that overflows `usize` is reported as a shape mismatch
/// with `expected == usize::MAX`.
fn param<'m>(model: &'m LoadedModel, name: &str, dims: &[usize]) -> InferenceResult<&'m [f32]> {
    let tensor = model.param(name)?;
    let actual = tensor.data.len();
    match element_count(dims) {
        Some(expected) if expected == actual => Ok(&tensor.data),
        expected => Err(InferenceError::ParameterShape {
            name: name.to_owned(),
            expected: expected.unwrap_or(usize::MAX),
            actual,
        }),
    }
}

/// Weights and biases of one convolution layer
struct ConvLayer<'m> {
    weight: &'m [f32],
    bias: &'m [f32],
    in_channels: usize,
    out_channels: usize,
}

/// Resolve every convolution layer, checking sizes before any feature map is built
fn conv_layers(model: &LoadedModel) -> InferenceResult<Vec<ConvLayer<'_>>> {
    let arch = model.architecture();
    let mut in_channels = arch.input_channels;
    let mut layers = Vec::with_capacity(arch.conv_channels.len());

    for (layer, &out_channels) in arch.conv_channels.iter().enumerate() {
        let weight = param(
            model,
            &conv_weight_name(layer),
            &[out_channels, in_channels, KERNEL, KERNEL],
        )?;
        let bias = param(model, &conv_bias_name(layer), &[out_channels])?;
        layers.push(ConvLayer {
            weight,
            bias,
            in_channels,
            out_channels,
        });
        in_channels = out_channels;
    }
    Ok(layers)
}

fn run_conv(layers: &[ConvLayer<'_>], input: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut x = input.to_vec();
    for layer in layers {
        x = conv3x3_relu(
            &x,
            layer.in_channels,
            rows,
            cols,
            layer.weight,
            layer.bias,
            layer.out_channels,
        );
    }
    x
}

/// Convolution stack over an already built input tensor
///
/// `input` must hold `input_channels × rows × cols` values. Returns the last
/// layer's feature map `[conv_channels.last(), rows, cols]`.
pub fn conv_stack(
    model: &LoadedModel,
    input: &[f32],
    rows: usize,
    cols: usize,
) -> InferenceResult<Vec<f32>> {
    let layers = conv_layers(model)?;
    let expected = element_count(&[model.architecture().input_channels, rows, cols]);
    if expected != Some(input.len()) {
        return Err(InferenceError::InputShape {
            expected: expected.unwrap_or(usize::MAX),
            actual: input.len(),
        });
    }
    Ok(run_conv(&layers, input, rows, cols))
}

/// Pooled board embedding (before hold features)
pub fn encode(model: &LoadedModel, board: &Board) -> InferenceResult<Vec<f32>> {
    let arch = model.architecture();
    let (rows, cols) = (board.rows(), board.cols());
    // input_channels is bounded by the first layer's weights only after this
    let layers = conv_layers(model)?;
    let input = build_input(board, model.board_channels(), arch.input_channels);
    let features = run_conv(&layers, &input, rows, cols);
    Ok(global_avg_pool(&features, arch.pooled_width(), rows, cols))
}

/// Raw logits, one per model output
pub fn forward(
    model: &LoadedModel,
    board: &Board,
    held: Option<PieceKind>,
) -> InferenceResult<Vec<f32>> {
    let arch = model.architecture();
    // checked before the hold one-hot is allocated
    let in_features = arch.mlp_input().unwrap_or(usize::MAX);
    let w1 = param(model, MLP_HIDDEN_WEIGHT, &[arch.mlp_hidden, in_features])?;
    let b1 = param(model, MLP_HIDDEN_BIAS, &[arch.mlp_hidden])?;
    let w2 = param(model, MLP_OUT_WEIGHT, &[arch.num_outputs, arch.mlp_hidden])?;
    let b2 = param(model, MLP_OUT_BIAS, &[arch.num_outputs])?;

    let mut features = encode(model, board)?;
    if arch.extra_features > 0 {
        features.extend(hold_features(held, model.pieces(), arch.extra_features));
    }

    let mut hidden = linear(&features, w1, b1, arch.mlp_hidden);
    relu(&mut hidden);
    Ok(linear(&hidden, w2, b2, arch.num_outputs))
}

/// Shaped probabilities aligned with the model's outputs
///
/// Temperature-scaled softmax, then either the configured strategy or, when
/// `inverted`, distribution inversion in its place.
pub fn predict_probabilities(
    model: &LoadedModel,
    board: &Board,
    held: Option<PieceKind>,
    config: &InferenceConfig,
    inverted: bool,
) -> InferenceResult<Vec<f32>> {
    let logits = forward(model, board, held)?;
    let probs = softmax_with_temperature(&logits, config.temperature);

    let shaped = if inverted {
        invert(&probs)
    } else {
        match config.strategy {
            InferenceStrategy::CleanUniform => blend_clean_uniform(&probs, board),
            InferenceStrategy::Threshold => apply_threshold(&probs, config.threshold),
        }
    };
    Ok(shaped)
}

/// [`predict_probabilities`] paired with the model's piece order
pub fn predict_distribution(
    model: &LoadedModel,
    board: &Board,
    held: Option<PieceKind>,
    config: &InferenceConfig,
    inverted: bool,
) -> InferenceResult<Vec<PieceProbability>> {
    let probs = predict_probabilities(model, board, held, config, inverted)?;
    Ok(to_piece_probabilities(model.pieces(), &probs))
}
