//! Game-State Model
//!
//! Pure tic-tac-toe logic. No side effects, no graph types.
//!
//! ## Module Structure
//!
//! - `board`: Board, cells, marks and canonical keys
//! - `rules`: Winner, status, turn order, legal moves, reachability
//! - `state`: Node metadata and role tags derived from a board

pub mod board;
pub mod rules;
pub mod state;

// Re-export key types
pub use board::{Board, BoardError, Cell, Mark, Move, EMPTY_CHAR};
pub use rules::{
    count_marks, is_full, is_reachable, legal_moves, next_player, status_of, winner, GameStatus,
};
pub use state::{GameStateMeta, NodeRole, Palette};
