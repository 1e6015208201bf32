//! Core primitives.
//!
//! Vector math, seeded randomness, topology hashing, frame timing and
//! config errors.
//! Everything above this layer builds on these types.

pub mod vec3;
pub mod rng;
pub mod hash;
pub mod clock;
pub mod config;

// Re-export core types
pub use vec3::Vec3;
pub use rng::DeterministicRng;
pub use hash::{compute_graph_digest, GraphDigest, GraphHasher};
pub use clock::FrameCounter;
pub use config::{env_override, ConfigError};
