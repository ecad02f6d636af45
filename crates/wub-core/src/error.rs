//! Error types for model loading and inference
//!
//! None of these ever stop piece generation: callers fall back to uniform
//! sampling, so the worst case is indistinguishable from the pure-random
//! strategy.

/// Failure while obtaining a model (transport or parse)
///
/// Recoverable: the model slot simply stays empty.
#[derive(thiserror::Error, Debug)]
pub enum ModelLoadError {
    /// File / transport I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Payload is not valid JSON or does not match the bundle shape
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// `data` length differs from the product of `shape`
    #[error("tensor {name}: shape implies {expected} values, got {actual}")]
    TensorShape {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Declared architecture cannot be run
    #[error("invalid model architecture: {0}")]
    Architecture(String),

    /// Background load task did not complete
    #[error("model load task failed: {0}")]
    Task(String),
}

/// A named tensor required by the forward pass is absent
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("missing model parameter: {name}")]
pub struct MissingParameterError {
    pub name: String,
}

/// Failure of a single inference call
///
/// Fatal for that call only; the generator treats the lock as if no model
/// were present.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error(transparent)]
    MissingParameter(#[from] MissingParameterError),

    /// Tensor exists but its element count does not fit the layer
    #[error("parameter {name}: expected {expected} values, got {actual}")]
    ParameterShape {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Input tensor length differs from `input_channels × rows × cols`
    #[error("input tensor: expected {expected} values, got {actual}")]
    InputShape { expected: usize, actual: usize },
}

/// Result type for inference calls
pub type InferenceResult<T> = Result<T, InferenceError>;
