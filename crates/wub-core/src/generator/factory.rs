//! Configuration → generator constructor

use super::{BagGenerator, Generator, ModelGenerator, RandomGenerator, TableGenerator};
use crate::config::{GeneratorConfig, GeneratorKind};
use crate::model::ModelSlot;

/// Seed → fresh generator
pub type GeneratorCtor = Box<dyn Fn(u32) -> Generator + Send + Sync>;

/// Map a configuration to a seeded constructor
///
/// The returned closure captures a copy of the relevant settings and, for
/// model-backed kinds, a handle to `slot`; every generator it builds sees
/// later swaps of that slot.
pub fn generator_factory(config: &GeneratorConfig, slot: &ModelSlot) -> GeneratorCtor {
    match config.kind {
        GeneratorKind::Bag => Box::new(|seed| BagGenerator::seven(seed).into()),
        GeneratorKind::BagPlusOne => {
            let extra = config.extra_piece;
            Box::new(move |seed| BagGenerator::plus_one(seed, extra).into())
        }
        GeneratorKind::DoubledBag => Box::new(|seed| BagGenerator::doubled(seed).into()),
        GeneratorKind::Random => Box::new(|seed| RandomGenerator::new(seed).into()),
        GeneratorKind::Table => {
            let weights = config.table_weights();
            Box::new(move |seed| TableGenerator::new(seed, weights).into())
        }
        GeneratorKind::Model => {
            let slot = slot.clone();
            let inference = config.inference;
            Box::new(move |seed| ModelGenerator::new(seed, slot.clone(), inference).into())
        }
        GeneratorKind::Curse => {
            let slot = slot.clone();
            let inference = config.inference;
            Box::new(move |seed| ModelGenerator::curse(seed, slot.clone(), inference).into())
        }
    }
}
