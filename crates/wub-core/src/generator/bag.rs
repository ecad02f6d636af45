//! Bag generators: shuffle a fixed multiset, serve it, repeat

use super::PieceGenerator;
use crate::rng::Xorshift32;
use crate::types::PieceKind;
use std::collections::VecDeque;

/// Kinds appearing twice in a doubled bag
pub const DOUBLED_KINDS: [PieceKind; 4] = [PieceKind::I, PieceKind::T, PieceKind::J, PieceKind::L];

/// Multiset served per bag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagKind {
    /// One of each kind (7 pieces)
    Seven,
    /// One of each kind plus one extra copy of the given piece (8 pieces)
    PlusOne(PieceKind),
    /// One of each kind plus a second copy of [`DOUBLED_KINDS`] (11 pieces)
    Doubled,
}

impl BagKind {
    pub fn name(self) -> &'static str {
        match self {
            BagKind::Seven => "bag",
            BagKind::PlusOne(_) => "bag_plus_one",
            BagKind::Doubled => "doubled_bag",
        }
    }

    /// Unshuffled contents of one bag
    pub fn contents(self) -> Vec<PieceKind> {
        let mut pieces = PieceKind::ALL.to_vec();
        match self {
            BagKind::Seven => {}
            BagKind::PlusOne(extra) => pieces.push(extra),
            BagKind::Doubled => pieces.extend_from_slice(&DOUBLED_KINDS),
        }
        pieces
    }

    pub fn size(self) -> usize {
        match self {
            BagKind::Seven => PieceKind::ALL.len(),
            BagKind::PlusOne(_) => PieceKind::ALL.len() + 1,
            BagKind::Doubled => PieceKind::ALL.len() + DOUBLED_KINDS.len(),
        }
    }
}

/// Queue-backed bag shuffler
#[derive(Debug, Clone)]
pub struct BagGenerator {
    kind: BagKind,
    rng: Xorshift32,
    queue: VecDeque<PieceKind>,
}

impl BagGenerator {
    pub fn new(kind: BagKind, seed: u32) -> Self {
        Self {
            kind,
            rng: Xorshift32::new(seed),
            queue: VecDeque::with_capacity(kind.size() * 2),
        }
    }

    pub fn seven(seed: u32) -> Self {
        Self::new(BagKind::Seven, seed)
    }

    pub fn plus_one(seed: u32, extra: PieceKind) -> Self {
        Self::new(BagKind::PlusOne(extra), seed)
    }

    pub fn doubled(seed: u32) -> Self {
        Self::new(BagKind::Doubled, seed)
    }

    #[inline]
    pub fn kind(&self) -> BagKind {
        self.kind
    }

    /// Pieces already shuffled and waiting
    #[inline]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Shuffle one fresh bag onto the back of the queue
    fn refill(&mut self) {
        let mut bag = self.kind.contents();
        shuffle(&mut bag, &mut self.rng);
        self.queue.extend(bag);
    }
}

/// In-place Fisher–Yates, walking from the back
pub(crate) fn shuffle<T>(items: &mut [T], rng: &mut Xorshift32) {
    for i in (1..items.len()).rev() {
        let j = rng.next_int(i + 1);
        items.swap(i, j);
    }
}

impl PieceGenerator for BagGenerator {
    fn next_piece(&mut self) -> PieceKind {
        if self.queue.is_empty() {
            self.refill();
        }
        // a refill always adds at least the seven canonical pieces
        self.queue.pop_front().unwrap_or(PieceKind::I)
    }

    fn peek(&mut self, n: usize) -> Vec<PieceKind> {
        while self.queue.len() < n {
            self.refill();
        }
        self.queue.iter().take(n).copied().collect()
    }

    fn reset(&mut self, seed: u32) {
        self.rng.seed(seed);
        self.queue.clear();
    }
}
