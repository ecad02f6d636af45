//! Board → input tensor
//!
//! Each channel is an R×C plane in row-major order; planes are stacked in the
//! model's channel order.

use crate::types::{Board, PieceKind};
use std::fmt;

/// Input plane kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoardChannel {
    /// 1.0 where a cell is filled
    Occupancy,
    /// 1.0 at empty cells below a filled cell in the same column
    Holes,
    /// every cell of a row holds that row's filled fraction
    RowFill,
    /// Name this engine does not know; fed as an all-zero plane
    Unknown(String),
}

impl BoardChannel {
    pub fn from_name(name: &str) -> Self {
        match name {
            "occupancy" => BoardChannel::Occupancy,
            "holes" => BoardChannel::Holes,
            "row_fill" => BoardChannel::RowFill,
            other => BoardChannel::Unknown(other.to_owned()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BoardChannel::Occupancy => "occupancy",
            BoardChannel::Holes => "holes",
            BoardChannel::RowFill => "row_fill",
            BoardChannel::Unknown(name) => name,
        }
    }
}

impl fmt::Display for BoardChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Occupancy / holes / row-fill planes of one board
#[derive(Debug, Clone, PartialEq)]
pub struct BoardPlanes {
    pub rows: usize,
    pub cols: usize,
    pub occupancy: Vec<f32>,
    pub holes: Vec<f32>,
    pub row_fill: Vec<f32>,
}

impl BoardPlanes {
    pub fn new(board: &Board) -> Self {
        let rows = board.rows();
        let cols = board.cols();
        let size = rows * cols;
        let mut occupancy = vec![0.0f32; size];
        let mut holes = vec![0.0f32; size];
        let mut row_fill = vec![0.0f32; size];

        for row in 0..rows {
            let mut filled = 0usize;
            for col in 0..cols {
                if board.is_filled(row, col) {
                    occupancy[row * cols + col] = 1.0;
                    filled += 1;
                }
            }
            let ratio = if cols > 0 { filled as f32 / cols as f32 } else { 0.0 };
            row_fill[row * cols..(row + 1) * cols].fill(ratio);
        }

        // Scanned top to bottom per column
        for col in 0..cols {
            let mut filled_seen = false;
            for row in 0..rows {
                let idx = row * cols + col;
                if occupancy[idx] > 0.0 {
                    filled_seen = true;
                } else if filled_seen {
                    holes[idx] = 1.0;
                }
            }
        }

        Self {
            rows,
            cols,
            occupancy,
            holes,
            row_fill,
        }
    }

    /// Plane for `channel`, `None` for unknown channels
    pub fn plane(&self, channel: &BoardChannel) -> Option<&[f32]> {
        match channel {
            BoardChannel::Occupancy => Some(&self.occupancy),
            BoardChannel::Holes => Some(&self.holes),
            BoardChannel::RowFill => Some(&self.row_fill),
            BoardChannel::Unknown(_) => None,
        }
    }
}

/// Stack `channels` into a `[input_channels, R, C]` tensor
///
/// The stacked planes are zero-padded or truncated so the result is exactly
/// `input_channels × R × C` long, whatever the channel list length.
pub fn build_input(board: &Board, channels: &[BoardChannel], input_channels: usize) -> Vec<f32> {
    let planes = BoardPlanes::new(board);
    let plane_size = planes.rows * planes.cols;

    let mut input = Vec::with_capacity(channels.len() * plane_size);
    for channel in channels {
        match planes.plane(channel) {
            Some(plane) => input.extend_from_slice(plane),
            None => input.resize(input.len() + plane_size, 0.0),
        }
    }

    input.resize(input_channels * plane_size, 0.0);
    input
}

/// One-hot of the held piece: index 0 = no hold, `piece_index + 1` otherwise
///
/// Indices past the end are dropped silently.
pub fn hold_one_hot(held_index: Option<usize>, len: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; len];
    let idx = held_index.map_or(0, |i| i + 1);
    if let Some(slot) = out.get_mut(idx) {
        *slot = 1.0;
    }
    out
}

/// Held-piece one-hot using the model's piece order
pub fn hold_features(held: Option<PieceKind>, pieces: &[PieceKind], len: usize) -> Vec<f32> {
    let index = held.map(|p| pieces.iter().position(|&q| q == p).unwrap_or(p.index()));
    hold_one_hot(index, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planes() {
        let board = Board::from_rows(&["....", ".TT.", "....", "I..I"]).unwrap();
        let planes = BoardPlanes::new(&board);

        assert_eq!(&planes.occupancy[4..8], &[0.0, 1.0, 1.0, 0.0]);
        assert_eq!(&planes.row_fill[4..8], &[0.5; 4]);
        assert_eq!(&planes.row_fill[12..16], &[0.5; 4]);
        assert_eq!(&planes.row_fill[0..4], &[0.0; 4]);

        // below the T cells
        assert_eq!(planes.holes[2 * 4 + 1], 1.0);
        assert_eq!(planes.holes[3 * 4 + 1], 1.0);
        assert_eq!(planes.holes[3 * 4 + 2], 1.0);
        // nothing above column 0
        assert_eq!(planes.holes[2 * 4], 0.0);
        assert_eq!(planes.holes.iter().sum::<f32>(), 4.0);
    }

    #[test]
    fn test_build_input_default_channels() {
        let board = Board::from_rows(&["I.", ".."]).unwrap();
        let channels = [BoardChannel::Occupancy, BoardChannel::Holes, BoardChannel::RowFill];
        let input = build_input(&board, &channels, 3);
        assert_eq!(
            input,
            vec![
                1.0, 0.0, 0.0, 0.0, // occupancy
                0.0, 0.0, 1.0, 0.0, // holes
                0.5, 0.5, 0.0, 0.0, // row_fill
            ]
        );
    }

    #[test]
    fn test_build_input_pads_and_truncates() {
        let board = Board::from_rows(&["I.", ".."]).unwrap();

        let padded = build_input(&board, &[BoardChannel::Occupancy], 2);
        assert_eq!(padded, vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let channels = [BoardChannel::RowFill, BoardChannel::Occupancy];
        let truncated = build_input(&board, &channels, 1);
        assert_eq!(truncated, vec![0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_channel_is_zero_plane() {
        let board = Board::from_rows(&["II"]).unwrap();
        let channels = [BoardChannel::from_name("heights"), BoardChannel::Occupancy];
        let input = build_input(&board, &channels, 2);
        assert_eq!(input, vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_hold_one_hot() {
        assert_eq!(hold_one_hot(None, 3), vec![1.0, 0.0, 0.0]);
        assert_eq!(hold_one_hot(Some(1), 3), vec![0.0, 0.0, 1.0]);
        assert_eq!(hold_one_hot(Some(2), 3), vec![0.0, 0.0, 0.0]);
        assert!(hold_one_hot(None, 0).is_empty());
    }

    #[test]
    fn test_hold_features_use_model_order() {
        let pieces = [PieceKind::L, PieceKind::I];
        assert_eq!(hold_features(Some(PieceKind::I), &pieces, 3), vec![0.0, 0.0, 1.0]);
        assert_eq!(
            hold_features(Some(PieceKind::T), &PieceKind::ALL, 8),
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_channel_names() {
        for name in ["occupancy", "holes", "row_fill", "other"] {
            assert_eq!(BoardChannel::from_name(name).name(), name);
        }
    }
}
