//! # Tic-Tac-Toe State Graph
//!
//! Every reachable tic-tac-toe position as a graph, laid out in 3D by an
//! incremental force-directed simulation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    TTT STATE GRAPH                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                         │
//! │  ├── vec3.rs     - 3D f32 vector over flat buffers           │
//! │  ├── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │  ├── hash.rs     - Topology digests (SHA-256)                │
//! │  ├── clock.rs    - FPS counter                               │
//! │  └── config.rs   - Config errors, env overrides              │
//! │                                                              │
//! │  game/           - Pure tic-tac-toe rules                    │
//! │  ├── board.rs    - Board, marks, canonical keys              │
//! │  ├── rules.rs    - Winner, turn, legal moves, reachability   │
//! │  └── state.rs    - Node metadata, roles, palette             │
//! │                                                              │
//! │  graph/          - State-space graph                         │
//! │  ├── store.rs    - Nodes, edges, SoA physics buffers         │
//! │  ├── builder.rs  - BFS/DFS exploration                       │
//! │  └── events.rs   - Mutation events for the UI                │
//! │                                                              │
//! │  layout/         - Force-directed layout                     │
//! │  ├── config.rs   - Physics constants                         │
//! │  ├── grid.rs     - 3D spatial grid                           │
//! │  └── step.rs     - Per-tick simulation                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! `game` → `graph::builder` → `graph::store` → `layout` → renderer.
//! The renderer reads `positions()`, `colors()` and `edge_segments()` from
//! the store each frame and drains `take_events()` for UI updates.
//!
//! ## Determinism
//!
//! Given the same seed, builds and layout runs are reproducible:
//! - All randomness comes from the store's seeded Xorshift128+
//! - Hash maps are used for lookup only; iteration follows slot order
//! - The graph digest sorts names, so BFS and DFS builds compare equal

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod graph;
pub mod layout;

// Re-export commonly used types
pub use crate::core::{DeterministicRng, FrameCounter, GraphDigest, Vec3};
pub use game::{Board, GameStateMeta, GameStatus, Mark, NodeRole, Palette};
pub use graph::{
    build_state_space, BuildReport, Edge, GraphError, GraphEvent, GraphStore, Node, StoreConfig,
    Traversal, UNBOUNDED,
};
pub use layout::{kinetic_energy, ConfigError, LayoutConfig, LayoutEngine, RepulsionMode, StepStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Target render tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Number of reachable positions, including the empty board
pub const REACHABLE_STATES: usize = 5478;

/// Number of reachable positions where the game is over
pub const TERMINAL_STATES: usize = 958;
