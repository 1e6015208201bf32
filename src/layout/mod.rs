//! Force-Directed Layout
//!
//! ## Module Structure
//!
//! - `config`: Physics constants, env/JSON loading, validation
//! - `grid`: Uniform 3D spatial bucketing for repulsion
//! - `step`: The per-tick simulation

pub mod config;
pub mod grid;
pub mod step;

// Re-export key types
pub use config::{ConfigError, LayoutConfig, RepulsionMode};
pub use grid::SpatialGrid;
pub use step::{kinetic_energy, LayoutEngine, StepStats};
