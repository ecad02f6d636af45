//! Locked-cell grid handed over by the game loop at lock time.

use super::piece::PieceKind;

/// Default playfield height
pub const BOARD_ROWS: usize = 20;

/// Default playfield width
pub const BOARD_COLS: usize = 10;

/// Board text parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardParseError {
    #[error("board has no rows")]
    Empty,

    #[error("row {row} has width {actual}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },

    #[error("invalid cell {ch:?} at row {row}, col {col}")]
    InvalidCell { row: usize, col: usize, ch: char },
}

/// Rectangular grid of cells, row 0 at the top
///
/// Each cell is either empty or holds the kind of the piece that locked there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Option<PieceKind>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_ROWS, BOARD_COLS)
    }
}

impl Board {
    /// Empty board of the given size
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Parse rows of text, top row first
    ///
    /// `.` is an empty cell, `IOTSZJL` are cells holding that kind.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BoardParseError> {
        let first = rows.first().ok_or(BoardParseError::Empty)?;
        let cols = first.as_ref().chars().count();
        let mut board = Board::new(rows.len(), cols);

        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let width = line.chars().count();
            if width != cols {
                return Err(BoardParseError::RaggedRow {
                    row,
                    expected: cols,
                    actual: width,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '.' => None,
                    _ => Some(
                        PieceKind::from_letter(ch)
                            .ok_or(BoardParseError::InvalidCell { row, col, ch })?,
                    ),
                };
                board.set(row, col, cell);
            }
        }

        Ok(board)
    }

    /// Parse a multi-line string, ignoring blank lines and surrounding whitespace
    pub fn parse(text: &str) -> Result<Self, BoardParseError> {
        let rows: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        Self::from_rows(&rows)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell content; out-of-range coordinates read as empty
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<PieceKind> {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col]
        } else {
            None
        }
    }

    /// Overwrite a cell; out-of-range coordinates are ignored
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, cell: Option<PieceKind>) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = cell;
        }
    }

    #[inline]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some()
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Row-major view of the cells
    pub fn cells(&self) -> &[Option<PieceKind>] {
        &self.cells
    }

    /// Text form accepted by [`Board::from_rows`]
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.cols.max(1))
            .take(self.rows)
            .map(|row| row.iter().map(|c| c.map_or('.', PieceKind::letter)).collect())
            .collect()
    }
}
