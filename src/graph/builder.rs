//! State-Space Builder
//!
//! Explores every reachable tic-tac-toe position from the empty board and
//! records it in a [`GraphStore`]: one node per distinct position, one edge
//! per legal move.
//!
//! ## Algorithm
//!
//! ```text
//! seed empty board ─► frontier ─► pop ─► refresh metadata
//!                        ▲                 │
//!                        │          terminal? ─► skip
//!                        │                 │
//!                        └── unseen ◄── each legal move ─► node + edge
//! ```
//!
//! Breadth-first uses a queue, depth-first a stack. Both visit the same
//! 5478 positions and record the same edges; only slot order differs.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::game::{is_reachable, legal_moves, Board, GameStateMeta};
use super::store::GraphStore;

/// No cap on the number of nodes.
pub const UNBOUNDED: usize = usize::MAX;

// =============================================================================
// TRAVERSAL
// =============================================================================

/// Frontier discipline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Traversal {
    /// Queue: level by level
    #[default]
    Bfs,
    /// Stack: one line of play to the end first
    Dfs,
}

impl Traversal {
    /// The other discipline.
    pub fn opposite(self) -> Self {
        match self {
            Traversal::Bfs => Traversal::Dfs,
            Traversal::Dfs => Traversal::Bfs,
        }
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Traversal::Bfs => write!(f, "bfs"),
            Traversal::Dfs => write!(f, "dfs"),
        }
    }
}

/// Unrecognised traversal name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown traversal {0:?}, expected \"bfs\" or \"dfs\"")]
pub struct ParseTraversalError(
    /// Rejected input
    pub String,
);

impl FromStr for Traversal {
    type Err = ParseTraversalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" => Ok(Traversal::Bfs),
            "dfs" => Ok(Traversal::Dfs),
            _ => Err(ParseTraversalError(s.to_string())),
        }
    }
}

enum Frontier {
    Queue(VecDeque<Board>),
    Stack(Vec<Board>),
}

impl Frontier {
    fn new(traversal: Traversal) -> Self {
        match traversal {
            Traversal::Bfs => Frontier::Queue(VecDeque::new()),
            Traversal::Dfs => Frontier::Stack(Vec::new()),
        }
    }

    fn push(&mut self, board: Board) {
        match self {
            Frontier::Queue(queue) => queue.push_back(board),
            Frontier::Stack(stack) => stack.push(board),
        }
    }

    fn pop(&mut self) -> Option<Board> {
        match self {
            Frontier::Queue(queue) => queue.pop_front(),
            Frontier::Stack(stack) => stack.pop(),
        }
    }
}

// =============================================================================
// BUILD
// =============================================================================

/// Summary of one build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Discipline used
    pub traversal: Traversal,
    /// Positions popped from the frontier
    pub expanded: usize,
    /// Nodes created by this build
    pub nodes_added: usize,
    /// Edges created by this build
    pub edges_added: usize,
    /// Terminal positions popped
    pub terminal: usize,
    /// True if the node cap stopped the build early
    pub capped: bool,
}

/// Explore the state space from the empty board into `store`.
///
/// Stops when the frontier is exhausted or this build has placed
/// `max_nodes` positions. The start board counts as placed whether it is
/// created or reused; other nodes already in the store do not count, so
/// unrelated nodes never shrink the budget. Children that would exceed the
/// cap are neither created nor connected. An existing start node is reused,
/// and transitions the store already holds are skipped, so building twice
/// is a no-op.
#[instrument(skip(store), fields(existing = store.active_node_count()))]
pub fn build_state_space(
    store: &mut GraphStore,
    traversal: Traversal,
    max_nodes: usize,
) -> BuildReport {
    let palette = *store.palette();
    let mut report = BuildReport {
        traversal,
        ..BuildReport::default()
    };

    if max_nodes == 0 {
        debug!("Node cap is zero, nothing to build");
        report.capped = true;
        return report;
    }

    let start = Board::new();
    let start_key = start.to_key();
    if !store.contains(&start_key) {
        let meta = GameStateMeta::start();
        match store.add_node(start_key.clone(), palette.start, Some(meta)) {
            Ok(_) => report.nodes_added += 1,
            Err(e) => {
                debug!("Start node not placed: {}", e);
                return report;
            }
        }
    }
    // Positions this build has placed, new or reused
    let mut placed = 1;

    let mut frontier = Frontier::new(traversal);
    let mut seen: HashSet<Board> = HashSet::new();
    frontier.push(start);
    seen.insert(start);

    while placed < max_nodes {
        let Some(board) = frontier.pop() else {
            break;
        };
        report.expanded += 1;

        let key = board.to_key();
        let meta = GameStateMeta::from_board(&board);
        let next = meta.next_player;
        let terminal = meta.status.is_terminal();
        if let Some(index) = store.index_of(&key) {
            // Metadata is recomputed from the board every time it is popped
            if let Err(e) = store.set_state(index, meta) {
                debug!("Could not refresh {}: {}", key, e);
            }
        }

        if terminal {
            report.terminal += 1;
            continue;
        }
        let Some(player) = next else {
            continue;
        };

        for (row, col) in legal_moves(&board) {
            let child = board.apply_move(row, col, player);
            if !is_reachable(&child) {
                continue;
            }
            let child_key = child.to_key();

            if !store.contains(&child_key) {
                if placed >= max_nodes {
                    report.capped = true;
                    continue;
                }
                let child_meta = GameStateMeta::from_board(&child);
                let color = palette.color(child_meta.role());
                match store.add_node(child_key.clone(), color, Some(child_meta)) {
                    Ok(_) => {
                        report.nodes_added += 1;
                        placed += 1;
                    }
                    Err(e) => {
                        debug!("Skipped child {}: {}", child_key, e);
                        continue;
                    }
                }
            }

            match store.add_edge(&key, &child_key, Some((row, col)), Some(player)) {
                Ok(()) => report.edges_added += 1,
                Err(e) => debug!("Skipped transition {} -> {}: {}", key, child_key, e),
            }

            if seen.insert(child) {
                frontier.push(child);
            }
        }
    }

    if frontier.pop().is_some() {
        report.capped = true;
    }

    info!(
        "Built state space ({}): {} expanded, {} nodes added, {} edges added, {} terminal{}",
        traversal,
        report.expanded,
        report.nodes_added,
        report.edges_added,
        report.terminal,
        if report.capped { ", capped" } else { "" }
    );

    report
}

// =============================================================================
// TESTS
// =============================================================================
