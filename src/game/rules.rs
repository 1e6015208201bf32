//! Game Rules
//!
//! Pure functions over a [`Board`]: winner detection, turn order,
//! legal moves and the reachability filter used by the graph builder.

use std::fmt;
use serde::{Serialize, Deserialize};

use super::board::{Board, Cell, Mark, Move};

/// The eight winning lines as row-major cell indices.
pub const LINES: [[usize; 3]; 8] = [
    // rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Outcome classification of a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves remain and nobody has won
    Ongoing,
    /// Board full without a winner
    Draw,
    /// Three in a row for this mark
    Won(Mark),
}

impl GameStatus {
    /// True for `Draw` and `Won`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => write!(f, "ongoing"),
            GameStatus::Draw => write!(f, "draw"),
            GameStatus::Won(mark) => write!(f, "{}", mark),
        }
    }
}

/// Returns the mark forming any three-in-a-row.
///
/// Lines are checked rows first, then columns, then diagonals; the first
/// match wins. Boards with two winners are not reachable and are not
/// special-cased here.
pub fn winner(board: &Board) -> Option<Mark> {
    let cells = board.cells();
    LINES.iter().find_map(|&[a, b, c]| match cells[a] {
        Cell::Occupied(mark) if cells[b] == cells[a] && cells[c] == cells[a] => Some(mark),
        _ => None,
    })
}

/// True if no cell is empty.
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|c| *c != Cell::Empty)
}

/// Winner takes precedence over a full board.
pub fn status_of(board: &Board) -> GameStatus {
    if let Some(mark) = winner(board) {
        return GameStatus::Won(mark);
    }
    if is_full(board) {
        return GameStatus::Draw;
    }
    GameStatus::Ongoing
}

/// Returns `(x_count, o_count)`.
pub fn count_marks(board: &Board) -> (usize, usize) {
    board.cells().iter().fold((0, 0), |(x, o), cell| match cell {
        Cell::Occupied(Mark::X) => (x + 1, o),
        Cell::Occupied(Mark::O) => (x, o + 1),
        Cell::Empty => (x, o),
    })
}

/// Whose turn it is, judged by mark counts alone.
///
/// Returns `None` when the counts cannot come from alternating play.
pub fn next_player(board: &Board) -> Option<Mark> {
    let (x, o) = count_marks(board);
    if x < o || x > o + 1 {
        return None;
    }
    if x == o {
        Some(Mark::X)
    } else {
        Some(Mark::O)
    }
}

/// Empty cells in row-major order, or nothing if the game is over.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    if status_of(board) != GameStatus::Ongoing || next_player(board).is_none() {
        return Vec::new();
    }

    let mut moves = Vec::with_capacity(9);
    for row in 0..3 {
        for col in 0..3 {
            if board.get(row, col) == Cell::Empty {
                moves.push((row, col));
            }
        }
    }
    moves
}

/// Filters out boards no alternating game could produce.
///
/// Mark counts must satisfy `x == o` or `x == o + 1`, and a winner must
/// have made the last move: X wins need `x == o + 1`, O wins need `x == o`.
pub fn is_reachable(board: &Board) -> bool {
    let (x, o) = count_marks(board);
    if !(x == o || x == o + 1) {
        return false;
    }

    match winner(board) {
        Some(Mark::X) => x == o + 1,
        Some(Mark::O) => x == o,
        None => true,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn board(key: &str) -> Board {
        Board::from_key(key).unwrap()
    }

    fn cell_strategy() -> impl Strategy<Value = Cell> {
        prop_oneof![
            Just(Cell::Empty),
            Just(Cell::Occupied(Mark::X)),
            Just(Cell::Occupied(Mark::O)),
        ]
    }

    #[test]
    fn test_winner_rows_columns_diagonals() {
        assert_eq!(winner(&board("XXXOO----")), Some(Mark::X));
        assert_eq!(winner(&board("OX-OX-O-X")), Some(Mark::O));
        assert_eq!(winner(&board("X-O-XO--X")), Some(Mark::X));
        assert_eq!(winner(&board("XXO-O-OX-")), Some(Mark::O));
        assert_eq!(winner(&board("XOXXOOOXX")), None);
        assert_eq!(winner(&Board::new()), None);
    }

    #[test]
    fn test_status_winner_beats_full() {
        // Full board with a winning row for X
        assert_eq!(status_of(&board("XXXOOXXOO")), GameStatus::Won(Mark::X));
        assert_eq!(status_of(&board("XOXXOOOXX")), GameStatus::Draw);
        assert_eq!(status_of(&board("X--------")), GameStatus::Ongoing);
        assert!(GameStatus::Draw.is_terminal());
        assert!(!GameStatus::Ongoing.is_terminal());
    }

    #[test]
    fn test_next_player() {
        assert_eq!(next_player(&Board::new()), Some(Mark::X));
        assert_eq!(next_player(&board("X--------")), Some(Mark::O));
        assert_eq!(next_player(&board("XO-------")), Some(Mark::X));
        // O moved first
        assert_eq!(next_player(&board("O--------")), None);
        // X moved twice in a row
        assert_eq!(next_player(&board("XX-------")), None);
    }

    #[test]
    fn test_legal_moves() {
        assert_eq!(legal_moves(&Board::new()).len(), 9);
        assert_eq!(
            legal_moves(&board("XOXOXO---")),
            vec![(2, 0), (2, 1), (2, 2)]
        );
        // Won boards have no moves even with empty cells
        assert!(legal_moves(&board("XXXOO----")).is_empty());
        // Inconsistent counts have no moves
        assert!(legal_moves(&board("OO-------")).is_empty());
    }

    #[test]
    fn test_is_reachable_examples() {
        assert!(is_reachable(&Board::new()));
        assert!(is_reachable(&board("XXXOO----")));
        assert!(is_reachable(&board("OOOXX-X--")));
        // O wins but X has moved more
        assert!(!is_reachable(&board("OOOXXX-X-")));
        // X wins but counts are level
        assert!(!is_reachable(&board("XXXOOO---")));
        assert!(!is_reachable(&board("XX-------")));
        assert!(!is_reachable(&board("O--------")));
    }

    proptest! {
        #[test]
        fn prop_reachability_filter(cells in prop::array::uniform9(cell_strategy())) {
            let b = Board::from_cells(cells);
            let (x, o) = count_marks(&b);

            if x != o && x != o + 1 {
                prop_assert!(!is_reachable(&b));
            }
            if winner(&b) == Some(Mark::O) && x != o {
                prop_assert!(!is_reachable(&b));
            }
            if winner(&b) == Some(Mark::X) && x != o + 1 {
                prop_assert!(!is_reachable(&b));
            }
        }

        #[test]
        fn prop_moves_only_on_empty_cells(cells in prop::array::uniform9(cell_strategy())) {
            let b = Board::from_cells(cells);
            for (row, col) in legal_moves(&b) {
                prop_assert_eq!(b.get(row, col), Cell::Empty);
            }
        }
    }
}
