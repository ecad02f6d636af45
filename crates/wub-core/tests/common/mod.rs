//! Shared model fixtures for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use wub_core::model::{ArchitectureJson, ModelPayload, TensorJson};
use wub_core::{LoadedModel, PieceKind};

fn tensor(shape: &[usize], data: Vec<f32>) -> TensorJson {
    TensorJson {
        shape: shape.to_vec(),
        data,
    }
}

/// Payload whose logits are `biases` regardless of the board
pub fn constant_payload(biases: &[f32]) -> ModelPayload {
    let n = biases.len();
    let mut params = HashMap::new();
    params.insert("conv.0.weight".to_owned(), tensor(&[1, 1, 3, 3], vec![0.0; 9]));
    params.insert("conv.0.bias".to_owned(), tensor(&[1], vec![0.0]));
    params.insert("mlp.0.weight".to_owned(), tensor(&[1, 1], vec![0.0]));
    params.insert("mlp.0.bias".to_owned(), tensor(&[1], vec![0.0]));
    params.insert("mlp.2.weight".to_owned(), tensor(&[n, 1], vec![0.0; n]));
    params.insert("mlp.2.bias".to_owned(), tensor(&[n], biases.to_vec()));

    ModelPayload {
        schema: Some(wub_core::model::MODEL_SCHEMA_V1.to_owned()),
        model: ArchitectureJson {
            input_channels: 1,
            conv_channels: vec![1],
            mlp_hidden: 1,
            extra_features: 0,
            num_outputs: n,
        },
        params,
        pieces: None,
        board_channels: Some(vec!["occupancy".to_owned()]),
    }
}

/// Payload that predicts `piece` with probability ~1
pub fn certain_payload(piece: PieceKind) -> ModelPayload {
    let mut biases = [-100.0f32; 7];
    biases[piece.index()] = 100.0;
    constant_payload(&biases)
}

pub fn certain_model(piece: PieceKind) -> LoadedModel {
    LoadedModel::from_payload(certain_payload(piece)).unwrap()
}

/// Unique path under the system temp dir
pub fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("wub-core-{}-{name}", std::process::id()))
}
