//! # wub-core
//!
//! Piece generation and prediction engine.
//!
//! Every turn the host game loop asks the active generator for the next piece
//! and notifies it when a piece locks. Combinatorial generators (bags, pure
//! random, weight table) only use the PRNG; model-backed generators run a small
//! CNN over the locked board at lock time and stage the sampled piece for the
//! following request.
//!
//! ## Module layout
//!
//! - `types`: `PieceKind`, `Board`
//! - `rng`: 32-bit xorshift PRNG
//! - `generator`: generator contract, bag/random/table/model strategies, factory
//! - `model`: exported parameter bundle, loader, hot-swappable model slot
//! - `infer`: board → logits forward pass
//! - `dist`: softmax and distribution shaping
//! - `sampler`: weighted index sampling
//! - `config`: TOML generator configuration
//! - `error`: error types
//!
//! ```
//! use wub_core::generator::{BagGenerator, PieceGenerator};
//!
//! let mut bag = BagGenerator::seven(42);
//! let preview = bag.peek(3);
//! assert_eq!(bag.next_piece(), preview[0]);
//! ```

pub mod config;
pub mod dist;
pub mod error;
pub mod generator;
pub mod infer;
pub mod model;
pub mod rng;
pub mod sampler;
pub mod types;

pub use config::{GeneratorConfig, GeneratorKind, InferenceConfig, InferenceStrategy};
pub use dist::PieceProbability;
pub use error::{InferenceError, MissingParameterError, ModelLoadError};
pub use generator::{Generator, GeneratorCtor, PieceGenerator, generator_factory};
pub use model::{LoadedModel, ModelSlot};
pub use rng::Xorshift32;
pub use types::{Board, PieceKind};
