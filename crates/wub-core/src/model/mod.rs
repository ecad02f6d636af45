//! Exported model bundle: typed tensors plus piece / channel metadata
//!
//! A `LoadedModel` is immutable once parsed and is shared read-only (via
//! `Arc`) by every model-backed generator. Newer models replace it wholesale
//! through a [`ModelSlot`].

mod payload;
mod slot;

pub use payload::{ArchitectureJson, MODEL_SCHEMA_V1, ModelPayload, TensorJson};
pub use slot::ModelSlot;

use crate::error::{MissingParameterError, ModelLoadError};
use crate::infer::{BoardChannel, KERNEL, element_count};
use crate::types::{PIECE_COUNT, PieceKind};
use flate2::read::GzDecoder;
use log::{info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// gzip magic bytes
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Channels assumed when the payload does not list any
pub const DEFAULT_BOARD_CHANNELS: [BoardChannel; 3] =
    [BoardChannel::Occupancy, BoardChannel::Holes, BoardChannel::RowFill];

/// Named float32 tensor
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTensor {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl ModelTensor {
    /// Element count implied by `shape`, `None` if it overflows `usize`
    pub fn numel(&self) -> Option<usize> {
        element_count(&self.shape)
    }
}

/// Architecture configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArchitecture {
    pub input_channels: usize,
    /// Output widths of the 3x3 convolution stack, in order
    pub conv_channels: Vec<usize>,
    pub mlp_hidden: usize,
    /// Length of the held-piece one-hot appended after pooling (0 = none)
    pub extra_features: usize,
    pub num_outputs: usize,
}

impl ModelArchitecture {
    /// Width of the pooled feature vector (last convolution width)
    pub fn pooled_width(&self) -> usize {
        self.conv_channels.last().copied().unwrap_or(0)
    }

    /// MLP input width, `None` if it overflows `usize`
    pub fn mlp_input(&self) -> Option<usize> {
        self.pooled_width().checked_add(self.extra_features)
    }

    /// Reject architectures the forward pass cannot run
    ///
    /// Every layer must be non-empty and every weight tensor's element count
    /// must fit in `usize`.
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        let invalid = |msg: String| Err(ModelLoadError::Architecture(msg));

        if self.input_channels == 0 {
            return invalid("input_channels is 0".to_owned());
        }
        if self.conv_channels.is_empty() || self.conv_channels.contains(&0) {
            return invalid(format!(
                "conv_channels must be non-empty and positive, got {:?}",
                self.conv_channels
            ));
        }
        if self.mlp_hidden == 0 {
            return invalid("mlp_hidden is 0".to_owned());
        }
        if self.num_outputs == 0 {
            return invalid("num_outputs is 0".to_owned());
        }

        let mut in_channels = self.input_channels;
        for (layer, &out_channels) in self.conv_channels.iter().enumerate() {
            if element_count(&[out_channels, in_channels, KERNEL, KERNEL]).is_none() {
                return invalid(format!(
                    "conv layer {layer} ({in_channels} -> {out_channels}) is too large"
                ));
            }
            in_channels = out_channels;
        }

        let Some(mlp_input) = self.mlp_input() else {
            return invalid(format!(
                "mlp input width {} + {} overflows",
                self.pooled_width(),
                self.extra_features
            ));
        };
        if element_count(&[self.mlp_hidden, mlp_input]).is_none()
            || element_count(&[self.num_outputs, self.mlp_hidden]).is_none()
        {
            return invalid(format!(
                "mlp ({mlp_input} -> {} -> {}) is too large",
                self.mlp_hidden, self.num_outputs
            ));
        }
        Ok(())
    }
}

impl From<ArchitectureJson> for ModelArchitecture {
    fn from(a: ArchitectureJson) -> Self {
        Self {
            input_channels: a.input_channels,
            conv_channels: a.conv_channels,
            mlp_hidden: a.mlp_hidden,
            extra_features: a.extra_features,
            num_outputs: a.num_outputs,
        }
    }
}

/// Parsed model
#[derive(Debug, Clone)]
pub struct LoadedModel {
    arch: ModelArchitecture,
    params: HashMap<String, ModelTensor>,
    pieces: Vec<PieceKind>,
    board_channels: Vec<BoardChannel>,
}

impl LoadedModel {
    /// Build from a deserialized payload
    ///
    /// - the piece list falls back to the canonical order when absent, unparsable,
    ///   or not `num_outputs` long; a model with other than 7 outputs and no
    ///   usable list is rejected
    /// - board channels default to `occupancy, holes, row_fill`
    pub fn from_payload(payload: ModelPayload) -> Result<Self, ModelLoadError> {
        if let Some(schema) = payload.schema.as_deref() {
            if schema != MODEL_SCHEMA_V1 {
                warn!("unrecognized model schema {schema:?}, loading anyway");
            }
        }

        let arch = ModelArchitecture::from(payload.model);
        arch.validate()?;

        let mut params = HashMap::with_capacity(payload.params.len());
        for (name, tensor) in payload.params {
            let tensor = ModelTensor {
                shape: tensor.shape,
                data: tensor.data,
            };
            let actual = tensor.data.len();
            match tensor.numel() {
                Some(expected) if expected == actual => {}
                Some(expected) => {
                    return Err(ModelLoadError::TensorShape {
                        name,
                        expected,
                        actual,
                    });
                }
                None => {
                    return Err(ModelLoadError::Architecture(format!(
                        "tensor {name}: shape {:?} overflows the element count",
                        tensor.shape
                    )));
                }
            }
            params.insert(name, tensor);
        }

        let pieces = resolve_pieces(payload.pieces.as_deref(), arch.num_outputs)?;
        let board_channels = match payload.board_channels {
            Some(names) if !names.is_empty() => names
                .iter()
                .map(|name| {
                    let channel = BoardChannel::from_name(name);
                    if let BoardChannel::Unknown(_) = channel {
                        warn!("unknown board channel {name:?}, feeding zeros");
                    }
                    channel
                })
                .collect(),
            _ => DEFAULT_BOARD_CHANNELS.to_vec(),
        };

        Ok(Self {
            arch,
            params,
            pieces,
            board_channels,
        })
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ModelLoadError> {
        let payload: ModelPayload = serde_json::from_str(json)?;
        Self::from_payload(payload)
    }

    /// Parse JSON from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        let payload: ModelPayload = serde_json::from_reader(reader)?;
        Self::from_payload(payload)
    }

    /// Parse plain or gzip-compressed JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        if bytes.starts_with(&GZIP_MAGIC) {
            Self::from_reader(GzDecoder::new(bytes))
        } else {
            let payload: ModelPayload = serde_json::from_slice(bytes)?;
            Self::from_payload(payload)
        }
    }

    /// Load from a file (`.json` or gzip-compressed)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let model = Self::from_bytes(&bytes)?;
        info!("loaded model {} ({})", path.display(), model.summary());
        Ok(model)
    }

    /// Async variant of [`LoadedModel::load`]
    #[cfg(feature = "async-load")]
    pub async fn load_async<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref().to_path_buf();
        let bytes = tokio::fs::read(&path).await?;
        let model = Self::from_bytes(&bytes)?;
        info!("loaded model {} ({})", path.display(), model.summary());
        Ok(model)
    }

    #[inline]
    pub fn architecture(&self) -> &ModelArchitecture {
        &self.arch
    }

    /// Piece order of the output logits
    #[inline]
    pub fn pieces(&self) -> &[PieceKind] {
        &self.pieces
    }

    /// Channel order of the input tensor
    #[inline]
    pub fn board_channels(&self) -> &[BoardChannel] {
        &self.board_channels
    }

    /// Named parameter lookup
    pub fn param(&self, name: &str) -> Result<&ModelTensor, MissingParameterError> {
        self.params.get(name).ok_or_else(|| MissingParameterError {
            name: name.to_owned(),
        })
    }

    /// Number of named parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Position of `piece` in the output order, falling back to its canonical index
    pub fn piece_index(&self, piece: PieceKind) -> usize {
        self.pieces.iter().position(|&p| p == piece).unwrap_or(piece.index())
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        let pieces: String = self.pieces.iter().map(|p| p.letter()).collect();
        format!(
            "in={} conv={:?} hidden={} extra={} out={} pieces={}",
            self.arch.input_channels,
            self.arch.conv_channels,
            self.arch.mlp_hidden,
            self.arch.extra_features,
            self.arch.num_outputs,
            pieces
        )
    }
}

/// Output piece order: the payload's list when usable, else the canonical one
///
/// The canonical fallback only lines up with a 7-output model; any other
/// width without a usable list is an error.
fn resolve_pieces(
    names: Option<&[String]>,
    num_outputs: usize,
) -> Result<Vec<PieceKind>, ModelLoadError> {
    if let Some(names) = names {
        let parsed: Option<Vec<PieceKind>> = names.iter().map(|n| n.parse().ok()).collect();
        match parsed {
            Some(pieces) if pieces.len() == num_outputs => return Ok(pieces),
            Some(pieces) => warn!(
                "model lists {} pieces but has {num_outputs} outputs, using canonical order",
                pieces.len()
            ),
            None => warn!("model piece list {names:?} is invalid, using canonical order"),
        }
    }

    if num_outputs != PIECE_COUNT {
        return Err(ModelLoadError::Architecture(format!(
            "{num_outputs} outputs need a matching piece list, \
             the canonical order has {PIECE_COUNT}"
        )));
    }
    Ok(PieceKind::ALL.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn payload_json(pieces: &str, channels: &str) -> String {
        format!(
            r#"{{
                "model": {{"input_channels": 1, "conv_channels": [1], "mlp_hidden": 1,
                           "extra_features": 0, "num_outputs": 7}},
                "params": {{
                    "conv.0.weight": {{"shape": [1, 1, 3, 3], "data": [0,0,0,0,1,0,0,0,0]}},
                    "conv.0.bias": {{"shape": [1], "data": [0]}}
                }}
                {pieces}
                {channels}
            }}"#
        )
    }

    #[test]
    fn test_defaults() {
        let model = LoadedModel::from_json_str(&payload_json("", "")).unwrap();
        assert_eq!(model.pieces(), &PieceKind::ALL);
        assert_eq!(model.board_channels(), &DEFAULT_BOARD_CHANNELS);
        assert_eq!(model.param_count(), 2);
        assert_eq!(model.param("conv.0.weight").unwrap().shape, vec![1, 1, 3, 3]);
    }

    #[test]
    fn test_custom_piece_order() {
        let json = payload_json(r#", "pieces": ["L","J","Z","S","T","O","I"]"#, "");
        let model = LoadedModel::from_json_str(&json).unwrap();
        assert_eq!(model.pieces()[0], PieceKind::L);
        assert_eq!(model.piece_index(PieceKind::I), 6);
    }

    #[test]
    fn test_wrong_length_pieces_fall_back() {
        let json = payload_json(r#", "pieces": ["I","O"]"#, "");
        let model = LoadedModel::from_json_str(&json).unwrap();
        assert_eq!(model.pieces(), &PieceKind::ALL);
    }

    #[test]
    fn test_invalid_piece_name_falls_back() {
        let json = payload_json(r#", "pieces": ["I","O","T","S","Z","J","X"]"#, "");
        let model = LoadedModel::from_json_str(&json).unwrap();
        assert_eq!(model.pieces(), &PieceKind::ALL);
    }

    #[test]
    fn test_custom_channels() {
        let json = payload_json("", r#", "board_channels": ["row_fill", "mystery"]"#);
        let model = LoadedModel::from_json_str(&json).unwrap();
        assert_eq!(
            model.board_channels(),
            &[BoardChannel::RowFill, BoardChannel::Unknown("mystery".to_owned())]
        );
    }

    #[test]
    fn test_missing_param() {
        let model = LoadedModel::from_json_str(&payload_json("", "")).unwrap();
        let err = model.param("mlp.0.weight").unwrap_err();
        assert_eq!(err.name, "mlp.0.weight");
    }

    #[test]
    fn test_tensor_shape_mismatch_rejected() {
        let json = r#"{
            "model": {"input_channels": 1, "conv_channels": [1], "mlp_hidden": 1, "num_outputs": 7},
            "params": {"conv.0.bias": {"shape": [2], "data": [0]}}
        }"#;
        match LoadedModel::from_json_str(json) {
            Err(ModelLoadError::TensorShape { name, expected, actual }) => {
                assert_eq!(name, "conv.0.bias");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_conv_stack_rejected() {
        let json = r#"{
            "model": {"input_channels": 1, "conv_channels": [], "mlp_hidden": 1, "num_outputs": 7},
            "params": {}
        }"#;
        assert!(matches!(
            LoadedModel::from_json_str(json),
            Err(ModelLoadError::Architecture(_))
        ));
    }

    #[test]
    fn test_overflowing_tensor_shape_rejected() {
        let json = r#"{
            "model": {"input_channels": 1, "conv_channels": [1], "mlp_hidden": 1, "num_outputs": 7},
            "params": {"conv.0.weight": {"shape": [4294967296, 4294967296], "data": [0]}}
        }"#;
        match LoadedModel::from_json_str(json) {
            Err(ModelLoadError::Architecture(msg)) => {
                assert!(msg.contains("conv.0.weight"), "{msg}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_oversized_layers_rejected() {
        let archs = [
            r#"{"input_channels": 1, "conv_channels": [9223372036854775807], "mlp_hidden": 1, "num_outputs": 7}"#,
            r#"{"input_channels": 4294967296, "conv_channels": [4294967296], "mlp_hidden": 1, "num_outputs": 7}"#,
            r#"{"input_channels": 1, "conv_channels": [1], "mlp_hidden": 4294967296, "extra_features": 4294967296, "num_outputs": 7}"#,
            r#"{"input_channels": 1, "conv_channels": [1], "mlp_hidden": 1, "extra_features": 18446744073709551615, "num_outputs": 7}"#,
            r#"{"input_channels": 1, "conv_channels": [1], "mlp_hidden": 0, "num_outputs": 7}"#,
        ];
        for arch in archs {
            let json = format!(r#"{{"model": {arch}, "params": {{}}}}"#);
            assert!(
                matches!(LoadedModel::from_json_str(&json), Err(ModelLoadError::Architecture(_))),
                "accepted {arch}"
            );
        }
    }

    #[test]
    fn test_non_canonical_width_needs_piece_list() {
        let json = r#"{
            "model": {"input_channels": 1, "conv_channels": [1], "mlp_hidden": 1, "num_outputs": 9},
            "params": {}
        }"#;
        assert!(matches!(
            LoadedModel::from_json_str(json),
            Err(ModelLoadError::Architecture(_))
        ));

        // a wrong-length list cannot rescue it either
        let json = r#"{
            "model": {"input_channels": 1, "conv_channels": [1], "mlp_hidden": 1, "num_outputs": 3},
            "params": {},
            "pieces": ["I", "O"]
        }"#;
        assert!(matches!(
            LoadedModel::from_json_str(json),
            Err(ModelLoadError::Architecture(_))
        ));

        let json = r#"{
            "model": {"input_channels": 1, "conv_channels": [1], "mlp_hidden": 1, "num_outputs": 3},
            "params": {},
            "pieces": ["T", "S", "Z"]
        }"#;
        let model = LoadedModel::from_json_str(json).unwrap();
        assert_eq!(model.pieces(), &[PieceKind::T, PieceKind::S, PieceKind::Z]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(LoadedModel::from_json_str("{"), Err(ModelLoadError::Json(_))));
    }

    #[test]
    fn test_from_bytes_gzip() {
        let json = payload_json("", "");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let plain = LoadedModel::from_bytes(json.as_bytes()).unwrap();
        let gz = LoadedModel::from_bytes(&compressed).unwrap();
        assert_eq!(plain.summary(), gz.summary());
    }

    #[test]
    fn test_load_missing_file() {
        let err = LoadedModel::load("/nonexistent/wub/model.json").unwrap_err();
        assert!(matches!(err, ModelLoadError::Io(_)));
    }
}
