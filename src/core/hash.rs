//! Graph Hashing for Verification
//!
//! Provides order-independent digests of graph contents for:
//! - Comparing BFS and DFS builds of the state space
//! - Detecting accidental mutation in tests and the demo driver

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type GraphDigest = [u8; 32];

/// Hasher for graph contents.
///
/// Wraps SHA-256 with helpers for the values the store hashes.
/// Callers must feed items in a canonical (sorted) order.
pub struct GraphHasher {
    hasher: Sha256,
}

impl GraphHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for graph topology.
    pub fn for_topology() -> Self {
        Self::new(b"TTT_STATE_GRAPH_V1")
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a length-prefixed string.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u64(value.len() as u64);
        self.hasher.update(value.as_bytes());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> GraphDigest {
        self.hasher.finalize().into()
    }
}

/// Compute a topology digest.
///
/// Counts are hashed first; the closure then adds the sorted
/// node names and edge name pairs.
pub fn compute_graph_digest<F>(node_count: usize, edge_count: usize, add_topology: F) -> GraphDigest
where
    F: FnOnce(&mut GraphHasher),
{
    let mut hasher = GraphHasher::for_topology();

    hasher.update_u64(node_count as u64);
    hasher.update_u64(edge_count as u64);

    add_topology(&mut hasher);

    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_determinism() {
        let a = compute_graph_digest(2, 1, |h| {
            h.update_str("---------");
            h.update_str("X--------");
        });
        let b = compute_graph_digest(2, 1, |h| {
            h.update_str("---------");
            h.update_str("X--------");
        });
        assert_eq!(a, b);
    }

    #[test]
    fn test_length_prefix_separates_strings() {
        // "ab" + "c" must not collide with "a" + "bc"
        let a = compute_graph_digest(2, 0, |h| {
            h.update_str("ab");
            h.update_str("c");
        });
        let b = compute_graph_digest(2, 0, |h| {
            h.update_str("a");
            h.update_str("bc");
        });
        assert_ne!(a, b);
    }

    #[test]
    fn test_counts_are_hashed() {
        let a = compute_graph_digest(1, 0, |_| {});
        let b = compute_graph_digest(1, 1, |_| {});
        assert_ne!(a, b);
    }
}
