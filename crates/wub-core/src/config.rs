//! Generator configuration
//!
//! ```toml
//! kind = "model"          # bag | bag_plus_one | doubled_bag | random | table | model | curse
//! extra_piece = "I"       # duplicated piece of bag_plus_one
//! table = [1, 1, 1, 1, 1, 1, 1]   # I O T S Z J L weights for "table"
//!
//! [inference]
//! strategy = "threshold"  # clean_uniform | threshold
//! temperature = 0.8
//! threshold = 0.05
//! ```

use crate::types::{PIECE_COUNT, PieceKind};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Default absolute probability floor for the threshold strategy
pub const DEFAULT_THRESHOLD: f32 = 0.05;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// One of each piece per bag
    #[default]
    Bag,
    /// Full set plus one extra copy of `extra_piece`
    BagPlusOne,
    /// Full set with four kinds doubled
    DoubledBag,
    /// Uniform random per draw
    Random,
    /// Fixed per-piece weight table
    Table,
    /// Model-driven
    Model,
    /// Model-driven, inverted distribution
    Curse,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 7] = [
        GeneratorKind::Bag,
        GeneratorKind::BagPlusOne,
        GeneratorKind::DoubledBag,
        GeneratorKind::Random,
        GeneratorKind::Table,
        GeneratorKind::Model,
        GeneratorKind::Curse,
    ];

    /// Whether the strategy uses a model
    pub fn uses_model(self) -> bool {
        matches!(self, GeneratorKind::Model | GeneratorKind::Curse)
    }

    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::Bag => "bag",
            GeneratorKind::BagPlusOne => "bag_plus_one",
            GeneratorKind::DoubledBag => "doubled_bag",
            GeneratorKind::Random => "random",
            GeneratorKind::Table => "table",
            GeneratorKind::Model => "model",
            GeneratorKind::Curse => "curse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Post-softmax shaping for model-driven generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceStrategy {
    /// Blend toward uniform on clean, low boards
    #[default]
    CleanUniform,
    /// Drop entries below an absolute probability
    Threshold,
}

impl InferenceStrategy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "clean_uniform" => Some(InferenceStrategy::CleanUniform),
            "threshold" => Some(InferenceStrategy::Threshold),
            _ => None,
        }
    }
}

/// Inference tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub strategy: InferenceStrategy,
    /// Logit divisor; values ≤ 0 behave as 1
    pub temperature: f32,
    pub threshold: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            strategy: InferenceStrategy::default(),
            temperature: DEFAULT_TEMPERATURE,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Whole generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub kind: GeneratorKind,
    pub inference: InferenceConfig,
    pub extra_piece: PieceKind,
    /// Weights in canonical order; missing trailing entries count as 0
    pub table: Vec<f32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            kind: GeneratorKind::default(),
            inference: InferenceConfig::default(),
            extra_piece: PieceKind::I,
            table: vec![1.0; PIECE_COUNT],
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Table weights padded/truncated to one per canonical piece
    ///
    /// Negative and non-finite entries are replaced by 0.
    pub fn table_weights(&self) -> [f32; PIECE_COUNT] {
        let mut weights = [0.0f32; PIECE_COUNT];
        let entries = weights.iter_mut().zip(self.table.iter()).zip(PieceKind::ALL);
        for ((dst, &src), piece) in entries {
            *dst = sanitize_weight(src);
            if *dst != src {
                warn!("table weight {src} for {piece} is not finite and non-negative, using 0");
            }
        }
        weights
    }
}

/// Clamp a table weight into `[0, +inf)`; NaN and infinities become 0
#[inline]
pub(crate) fn sanitize_weight(w: f32) -> f32 {
    if w.is_finite() && w > 0.0 { w } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.kind, GeneratorKind::Bag);
        assert_eq!(config.inference.strategy, InferenceStrategy::CleanUniform);
        assert_eq!(config.inference.temperature, 1.0);
    }

    #[test]
    fn test_full_toml() {
        let text = r#"
            kind = "curse"
            extra_piece = "T"
            table = [2, 1]

            [inference]
            strategy = "threshold"
            temperature = 0.5
            threshold = 0.1
        "#;
        let config = GeneratorConfig::from_toml_str(text).unwrap();
        assert_eq!(config.kind, GeneratorKind::Curse);
        assert_eq!(config.extra_piece, PieceKind::T);
        assert_eq!(config.inference.strategy, InferenceStrategy::Threshold);
        assert_eq!(config.inference.temperature, 0.5);
        assert_eq!(config.inference.threshold, 0.1);
        assert_eq!(config.table_weights(), [2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_invalid_table_weights_clamped() {
        let text = "table = [2.0, -1.0, 0.5, -0.0, nan, inf]";
        let config = GeneratorConfig::from_toml_str(text).unwrap();
        let weights = config.table_weights();
        assert_eq!(weights, [2.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0]);
        assert!(weights.iter().all(|w| w.is_sign_positive()));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(GeneratorConfig::from_toml_str(r#"kind = "tgm""#).is_err());
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in GeneratorKind::ALL {
            assert_eq!(GeneratorKind::from_name(kind.name()), Some(kind));
            let toml_text = format!("kind = \"{}\"", kind.name());
            assert_eq!(GeneratorConfig::from_toml_str(&toml_text).unwrap().kind, kind);
        }
        assert!(GeneratorKind::Curse.uses_model());
        assert!(!GeneratorKind::Table.uses_model());
    }
}
