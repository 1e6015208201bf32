//! Board Representation
//!
//! Immutable 3×3 board and its canonical 9-character key.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Character used for an empty cell in canonical keys.
pub const EMPTY_CHAR: char = '-';

/// A board coordinate as `(row, col)`, both in `0..3`.
pub type Move = (usize, usize);

/// A player's mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Player X (moves first)
    X,
    /// Player O
    O,
}

impl Mark {
    /// Returns the other player's mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Key character for this mark.
    pub fn as_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single cell of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// No mark
    #[default]
    Empty,
    /// Cell holds a mark
    Occupied(Mark),
}

impl Cell {
    /// Key character for this cell.
    pub fn as_char(self) -> char {
        match self {
            Cell::Empty => EMPTY_CHAR,
            Cell::Occupied(mark) => mark.as_char(),
        }
    }

    /// Parse a key character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            EMPTY_CHAR => Some(Cell::Empty),
            'X' => Some(Cell::Occupied(Mark::X)),
            'O' => Some(Cell::Occupied(Mark::O)),
            _ => None,
        }
    }

    /// The mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }
}

/// Errors decoding a canonical key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Key is not exactly 9 characters.
    #[error("board key must have 9 cells, got {0}")]
    InvalidLength(usize),

    /// Key contains a character other than '-', 'X' or 'O'.
    #[error("invalid cell character {found:?} at position {position}")]
    InvalidCell {
        /// Offending character
        found: char,
        /// Row-major cell position
        position: usize,
    },
}

/// 3×3 tic-tac-toe board, row-major.
///
/// Boards are values: `apply_move` returns a new board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; 9],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Build a board from row-major cells.
    pub const fn from_cells(cells: [Cell; 9]) -> Self {
        Self { cells }
    }

    /// Cell at `(row, col)`.
    ///
    /// Panics if the coordinate is outside the board.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * 3 + col]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Returns a new board with `mark` placed at `(row, col)`.
    ///
    /// Legality is the caller's responsibility; an occupied cell is overwritten.
    pub fn apply_move(&self, row: usize, col: usize, mark: Mark) -> Self {
        let mut cells = self.cells;
        cells[row * 3 + col] = Cell::Occupied(mark);
        Self { cells }
    }

    /// Canonical 9-character key.
    pub fn to_key(&self) -> String {
        self.cells.iter().map(|c| c.as_char()).collect()
    }

    /// Decode a canonical key.
    pub fn from_key(key: &str) -> Result<Self, BoardError> {
        let count = key.chars().count();
        if count != 9 {
            return Err(BoardError::InvalidLength(count));
        }

        let mut cells = [Cell::Empty; 9];
        for (position, c) in key.chars().enumerate() {
            cells[position] = Cell::from_char(c)
                .ok_or(BoardError::InvalidCell { found: c, position })?;
        }
        Ok(Self { cells })
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let symbol = match self.get(row, col) {
                    Cell::Empty => ' ',
                    Cell::Occupied(mark) => mark.as_char(),
                };
                result.push(symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

// =============================================================================
// TESTS
// =============================================================================
