//! Core value types (PieceKind, Board)

mod board;
mod piece;

pub use board::{BOARD_COLS, BOARD_ROWS, Board, BoardParseError};
pub use piece::{PIECE_COUNT, ParsePieceError, PieceKind};
