//! Interchange shape of an exported model bundle
//!
//! ```json
//! {
//!   "schema": "wishuponablock.model.v1",
//!   "model": {"input_channels": 3, "conv_channels": [16, 32], "mlp_hidden": 64,
//!             "extra_features": 8, "num_outputs": 7},
//!   "params": {"conv.0.weight": {"shape": [16, 3, 3, 3], "data": [...]}, ...},
//!   "pieces": ["I", "O", "T", "S", "Z", "J", "L"],
//!   "board_channels": ["occupancy", "holes", "row_fill"]
//! }
//! ```
//!
//! Unknown top-level fields (`created_at`, `source`, ...) are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schema tag written by the exporter
pub const MODEL_SCHEMA_V1: &str = "wishuponablock.model.v1";

/// Architecture block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureJson {
    pub input_channels: usize,
    pub conv_channels: Vec<usize>,
    pub mlp_hidden: usize,
    #[serde(default)]
    pub extra_features: usize,
    pub num_outputs: usize,
}

/// One exported tensor (row-major flattened data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorJson {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// Whole bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub model: ArchitectureJson,
    pub params: HashMap<String, TensorJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pieces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_channels: Option<Vec<String>>,
}
