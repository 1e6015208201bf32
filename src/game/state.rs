//! Game State Metadata
//!
//! Per-node game information attached to graph nodes, and the
//! role tag the renderer uses to pick colors.

use serde::{Serialize, Deserialize};

use super::board::{Board, Mark};
use super::rules::{next_player, status_of, GameStatus};

// =============================================================================
// GAME STATE META
// =============================================================================

/// Game information carried by a state-space node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateMeta {
    /// Canonical 9-character board key
    pub canonical_key: String,

    /// Player to move; `None` once the game is over
    pub next_player: Option<Mark>,

    /// Outcome classification
    pub status: GameStatus,
}

impl GameStateMeta {
    /// Metadata for the empty starting board.
    pub fn start() -> Self {
        Self {
            canonical_key: Board::new().to_key(),
            next_player: Some(Mark::X),
            status: GameStatus::Ongoing,
        }
    }

    /// Derive metadata from a board.
    ///
    /// Terminal boards get no next player even when the mark counts
    /// would name one.
    pub fn from_board(board: &Board) -> Self {
        let status = status_of(board);
        let next = if status.is_terminal() {
            None
        } else {
            next_player(board)
        };
        Self {
            canonical_key: board.to_key(),
            next_player: next,
            status,
        }
    }

    /// Role of a node carrying this metadata.
    pub fn role(&self) -> NodeRole {
        if self.status.is_terminal() {
            return NodeRole::Terminal;
        }
        if self.canonical_key == Board::new().to_key() {
            return NodeRole::StartState;
        }
        match self.next_player {
            Some(Mark::X) => NodeRole::XToMove,
            Some(Mark::O) => NodeRole::OToMove,
            None => NodeRole::Terminal,
        }
    }
}

// =============================================================================
// NODE ROLE
// =============================================================================

/// What a state-space node represents, independent of any color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeRole {
    /// The empty board
    StartState = 0,
    /// X to move
    XToMove = 1,
    /// O to move
    OToMove = 2,
    /// Won or drawn
    Terminal = 3,
}

/// Maps node roles to packed RGB colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Empty board
    pub start: u32,
    /// X to move
    pub x_to_move: u32,
    /// O to move
    pub o_to_move: u32,
    /// Finished games
    pub terminal: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            start: 0x00ff00,
            x_to_move: 0xff0000,
            o_to_move: 0x0000ff,
            terminal: 0x808080,
        }
    }
}

impl Palette {
    /// Color for a role.
    pub fn color(&self, role: NodeRole) -> u32 {
        match role {
            NodeRole::StartState => self.start,
            NodeRole::XToMove => self.x_to_move,
            NodeRole::OToMove => self.o_to_move,
            NodeRole::Terminal => self.terminal,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_meta_matches_empty_board() {
        assert_eq!(GameStateMeta::start(), GameStateMeta::from_board(&Board::new()));
        assert_eq!(GameStateMeta::start().role(), NodeRole::StartState);
    }

    #[test]
    fn test_roles() {
        let x_moved = Board::new().apply_move(0, 0, Mark::X);
        assert_eq!(GameStateMeta::from_board(&x_moved).role(), NodeRole::OToMove);

        let o_moved = x_moved.apply_move(1, 1, Mark::O);
        assert_eq!(GameStateMeta::from_board(&o_moved).role(), NodeRole::XToMove);

        let won = Board::from_key("XXXOO----").unwrap();
        let meta = GameStateMeta::from_board(&won);
        assert_eq!(meta.role(), NodeRole::Terminal);
        assert_eq!(meta.next_player, None);
        assert_eq!(meta.status, GameStatus::Won(Mark::X));
    }

    #[test]
    fn test_palette_defaults() {
        let palette = Palette::default();
        assert_eq!(palette.color(NodeRole::StartState), 0x00ff00);
        assert_eq!(palette.color(NodeRole::XToMove), 0xff0000);
        assert_eq!(palette.color(NodeRole::OToMove), 0x0000ff);
        assert_eq!(palette.color(NodeRole::Terminal), 0x808080);
    }
}
