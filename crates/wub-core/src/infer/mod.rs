//! CNN inference kernel (board → logits)
//!
//! Pure float32 computation, synchronous, no allocation reuse across calls.

mod forward;
mod input;
mod layers;

pub use forward::{
    MLP_HIDDEN_BIAS, MLP_HIDDEN_WEIGHT, MLP_OUT_BIAS, MLP_OUT_WEIGHT, conv_bias_name,
    conv_stack, conv_weight_name, encode, forward, predict_distribution, predict_probabilities,
};
pub use input::{BoardChannel, BoardPlanes, build_input, hold_features, hold_one_hot};
pub use layers::{KERNEL, conv3x3_relu, element_count, global_avg_pool, linear, relu};
