//! Graph Events
//!
//! Committed store mutations, queued for the rendering/UI layer
//! (stats counters, node pickers, detail panels). Rejected operations
//! never produce an event.

use serde::{Serialize, Deserialize};

/// A committed change to the graph store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphEvent {
    /// A node was allocated
    NodeAdded {
        /// Slot
        index: usize,
        /// Unique name
        name: String,
    },

    /// An edge was recorded (canonical `a < b`)
    EdgeAdded {
        /// Lower endpoint
        a: usize,
        /// Higher endpoint
        b: usize,
    },

    /// A node was deactivated along with its edges
    NodeDeleted {
        /// Slot, now inactive
        index: usize,
        /// Former name
        name: String,
        /// Incident edges dropped with it
        edges_removed: usize,
    },

    /// The whole store was wiped
    Cleared {
        /// Active nodes dropped
        nodes: usize,
        /// Edges dropped
        edges: usize,
    },

    /// Selection moved
    SelectionChanged {
        /// Slot selected before
        previous: Option<usize>,
        /// Slot selected now
        current: Option<usize>,
    },
}

impl GraphEvent {
    /// True if node or edge counts changed.
    pub fn changes_counts(&self) -> bool {
        !matches!(self, GraphEvent::SelectionChanged { .. })
    }

    /// True if the set of node names changed (pickers need a refresh).
    pub fn changes_names(&self) -> bool {
        matches!(
            self,
            GraphEvent::NodeAdded { .. } | GraphEvent::NodeDeleted { .. } | GraphEvent::Cleared { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_classification() {
        let added = GraphEvent::NodeAdded { index: 0, name: "a".into() };
        let edge = GraphEvent::EdgeAdded { a: 0, b: 1 };
        let selected = GraphEvent::SelectionChanged { previous: None, current: Some(0) };

        assert!(added.changes_counts() && added.changes_names());
        assert!(edge.changes_counts() && !edge.changes_names());
        assert!(!selected.changes_counts() && !selected.changes_names());
    }

    #[test]
    fn test_event_serializes() {
        let event = GraphEvent::Cleared { nodes: 3, edges: 2 };
        let json = serde_json::to_string(&event).unwrap();
        let back: GraphEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
