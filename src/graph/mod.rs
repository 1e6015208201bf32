//! State-Space Graph
//!
//! ## Module Structure
//!
//! - `store`: Node/edge storage, physics buffers, selection
//! - `builder`: Reachable-position exploration into a store
//! - `events`: Committed mutations for the UI layer

pub mod builder;
pub mod events;
pub mod store;

// Re-export key types
pub use builder::{build_state_space, BuildReport, ParseTraversalError, Traversal, UNBOUNDED};
pub use events::GraphEvent;
pub use store::{Edge, GraphError, GraphStore, Node, StoreConfig};
