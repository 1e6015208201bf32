//! Layout Step
//!
//! One explicit-Euler tick of the force simulation over active nodes.
//!
//! ## Phases
//!
//! 1. Clear forces
//! 2. Repulsion between nearby pairs (`repulsion / d²`)
//! 3. Attraction along edges (`distance * attraction`)
//! 4. Centering (`-position * center`)
//! 5. Integrate velocity and position
//!
//! Inactive slots are skipped in every phase and keep their last position.

use serde::{Serialize, Deserialize};
#[cfg(feature = "debug-tracing")]
use tracing::trace;
use tracing::debug;

use crate::core::Vec3;
use crate::graph::store::{GraphStore, Node};
use super::config::{ConfigError, LayoutConfig, RepulsionMode, MAX_GRID_REACH};
use super::grid::SpatialGrid;

/// Summary of one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepStats {
    /// Nodes integrated
    pub active_nodes: usize,
    /// Pairs within the cutoff that were repelled
    pub repulsion_pairs: usize,
    /// Σ|v|² after integration
    pub kinetic_energy: f32,
}

/// Σ|v|² over active nodes.
pub fn kinetic_energy(store: &GraphStore) -> f32 {
    let velocities = store.velocities();
    store
        .active_nodes()
        .map(|n| Vec3::from_slot(velocities, n.index).length_squared())
        .sum()
}

/// Runs the force simulation against a [`GraphStore`].
#[derive(Clone, Debug)]
pub struct LayoutEngine {
    config: LayoutConfig,
    grid: SpatialGrid,
    tick: u64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        let config = LayoutConfig::default();
        Self {
            grid: SpatialGrid::new(config.cell_size),
            config,
            tick: 0,
        }
    }
}

impl LayoutEngine {
    /// Create an engine after validating `config`.
    pub fn new(config: LayoutConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid: SpatialGrid::new(config.cell_size),
            config,
            tick: 0,
        })
    }

    /// Current constants.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replace the constants for runtime tuning. Takes effect on the next
    /// step. An invalid config is rejected and the current one kept.
    pub fn set_config(&mut self, config: LayoutConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self, store: &mut GraphStore) -> StepStats {
        let config = &self.config;
        let view = store.physics_mut();
        let nodes = view.nodes;
        let positions = view.positions;
        let velocities = view.velocities;
        let forces = view.forces;

        forces.fill(0.0);

        let reach = config.grid_reach();
        let repulsion_pairs = match config.repulsion_mode {
            RepulsionMode::Grid if reach <= MAX_GRID_REACH => {
                self.grid.reset(config.cell_size);
                for node in nodes.iter().filter(|n| n.active) {
                    self.grid.insert(node.index, Vec3::from_slot(positions, node.index));
                }
                repel_grid(&self.grid, reach, nodes, positions, forces, config)
            }
            _ => repel_all_pairs(nodes, positions, forces, config),
        };

        for edge in view.edges {
            if !(nodes[edge.a].active && nodes[edge.b].active) {
                continue;
            }
            let pa = Vec3::from_slot(positions, edge.a);
            let pb = Vec3::from_slot(positions, edge.b);
            let pull = (pb - pa) * config.attraction_force;
            add_slot(forces, edge.a, pull);
            add_slot(forces, edge.b, -pull);
        }

        let scale = config.force_scale();
        let mut active_nodes = 0;
        let mut energy = 0.0;
        for node in nodes.iter().filter(|n| n.active) {
            let i = node.index;
            let p = Vec3::from_slot(positions, i);
            let f = Vec3::from_slot(forces, i) - p * config.center_force;
            f.write_slot(forces, i);

            let v = (Vec3::from_slot(velocities, i) + f * scale) * config.damping;
            v.write_slot(velocities, i);
            (p + v * config.position_scale).write_slot(positions, i);

            active_nodes += 1;
            energy += v.length_squared();
        }

        self.tick += 1;
        let stats = StepStats {
            active_nodes,
            repulsion_pairs,
            kinetic_energy: energy,
        };

        #[cfg(feature = "debug-tracing")]
        trace!(
            "Layout tick {}: {} nodes, {} pairs, energy {:.4}",
            self.tick,
            stats.active_nodes,
            stats.repulsion_pairs,
            stats.kinetic_energy
        );

        stats
    }

    /// Run `ticks` steps; returns the stats of the last one.
    pub fn run(&mut self, store: &mut GraphStore, ticks: u32) -> StepStats {
        let mut stats = StepStats::default();
        for _ in 0..ticks {
            stats = self.step(store);
        }
        debug!(
            "Ran {} layout ticks, energy {:.4}",
            ticks, stats.kinetic_energy
        );
        stats
    }
}

#[inline]
fn add_slot(buf: &mut [f32], slot: usize, v: Vec3) {
    (Vec3::from_slot(buf, slot) + v).write_slot(buf, slot);
}

/// Push `i` and `j` apart if they are within the cutoff.
#[inline]
fn repel_pair(i: usize, j: usize, positions: &[f32], forces: &mut [f32], config: &LayoutConfig) -> bool {
    let delta = Vec3::from_slot(positions, i) - Vec3::from_slot(positions, j);
    let d2 = delta.length_squared();
    if d2 > config.repulsion_cutoff * config.repulsion_cutoff {
        return false;
    }

    let dist = d2.sqrt().max(config.min_distance);
    let push = delta * (config.repulsion_force / (dist * dist * dist));
    add_slot(forces, i, push);
    add_slot(forces, j, -push);
    true
}

fn repel_all_pairs(nodes: &[Node], positions: &[f32], forces: &mut [f32], config: &LayoutConfig) -> usize {
    let mut pairs = 0;
    for i in 0..nodes.len() {
        if !nodes[i].active {
            continue;
        }
        for j in (i + 1)..nodes.len() {
            if nodes[j].active && repel_pair(i, j, positions, forces, config) {
                pairs += 1;
            }
        }
    }
    pairs
}

fn repel_grid(
    grid: &SpatialGrid,
    reach: i32,
    nodes: &[Node],
    positions: &[f32],
    forces: &mut [f32],
    config: &LayoutConfig,
) -> usize {
    let mut pairs = 0;
    for node in nodes.iter().filter(|n| n.active) {
        let i = node.index;
        let cell = grid.cell_of(Vec3::from_slot(positions, i));
        for j in grid.neighbors(cell, reach) {
            if j <= i {
                continue;
            }
            if repel_pair(i, j, positions, forces, config) {
                pairs += 1;
            }
        }
    }
    pairs
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::{build_state_space, Traversal};
    use crate::graph::store::StoreConfig;

    fn chain(n: usize, seed: u64) -> GraphStore {
        let mut store = GraphStore::new(StoreConfig { seed, ..StoreConfig::default() });
        for i in 0..n {
            store.add_node(format!("n{}", i), 0xffffff, None).unwrap();
        }
        for i in 1..n {
            store
                .add_edge(&format!("n{}", i - 1), &format!("n{}", i), None, None)
                .unwrap();
        }
        store
    }

    #[test]
    fn test_energy_decays_on_chain() {
        let mut store = chain(5, 42);
        let mut engine = LayoutEngine::default();

        let at_10 = engine.run(&mut store, 10).kinetic_energy;
        let at_1000 = engine.run(&mut store, 990).kinetic_energy;

        assert_eq!(engine.tick(), 1000);
        assert!(at_10 > 0.0);
        assert!(at_1000 < at_10, "{} >= {}", at_1000, at_10);
        assert!((kinetic_energy(&store) - at_1000).abs() < 1e-6);
    }

    #[test]
    fn test_grid_matches_all_pairs() {
        let mut grid_store = GraphStore::default();
        build_state_space(&mut grid_store, Traversal::Bfs, 300);
        let mut pairs_store = GraphStore::default();
        build_state_space(&mut pairs_store, Traversal::Bfs, 300);

        let mut grid_engine = LayoutEngine::default();
        let mut pairs_engine = LayoutEngine::new(LayoutConfig {
            repulsion_mode: RepulsionMode::AllPairs,
            ..LayoutConfig::default()
        })
        .unwrap();

        let a = grid_engine.step(&mut grid_store);
        let b = pairs_engine.step(&mut pairs_store);
        assert_eq!(a.repulsion_pairs, b.repulsion_pairs);
        assert!(a.repulsion_pairs > 0);

        grid_engine.run(&mut grid_store, 19);
        pairs_engine.run(&mut pairs_store, 19);

        for (x, y) in grid_store.positions().iter().zip(pairs_store.positions()) {
            assert!((x - y).abs() < 1e-3, "{} vs {}", x, y);
        }
    }

    #[test]
    fn test_inactive_nodes_frozen() {
        let mut store = chain(5, 7);
        store.delete_node("n2").unwrap();
        let frozen = store.position(2).unwrap();

        let mut engine = LayoutEngine::default();
        let stats = engine.run(&mut store, 50);

        assert_eq!(stats.active_nodes, 4);
        assert_eq!(store.position(2), Some(frozen));
        assert_eq!(store.velocity(2), Some(Vec3::ZERO));
    }

    #[test]
    fn test_centering_pulls_lone_node_home() {
        let mut store = chain(1, 1);
        let start = store.position(0).unwrap().length();

        let mut engine = LayoutEngine::default();
        engine.run(&mut store, 200);

        assert!(store.position(0).unwrap().length() < start);
    }

    #[test]
    fn test_repulsion_pushes_apart_and_respects_cutoff() {
        let mut store = chain(2, 3);
        // Remove the spring so only repulsion and centering act
        store.delete_node("n1").unwrap();
        store.add_node("a", 0, None).unwrap();
        store.add_node("b", 0, None).unwrap();
        let a = store.index_of("a").unwrap();
        let b = store.index_of("b").unwrap();
        store.set_position(a, Vec3::new(-5.0, 0.0, 0.0)).unwrap();
        store.set_position(b, Vec3::new(5.0, 0.0, 0.0)).unwrap();

        let mut engine = LayoutEngine::new(LayoutConfig {
            center_force: 0.0,
            ..LayoutConfig::default()
        })
        .unwrap();
        engine.step(&mut store);

        assert!(store.force(a).unwrap().x < 0.0);
        assert!(store.force(b).unwrap().x > 0.0);
        assert!(store.position(b).unwrap().x > 5.0);

        store.set_position(b, Vec3::new(500.0, 0.0, 0.0)).unwrap();
        store.set_position(a, Vec3::new(-500.0, 0.0, 0.0)).unwrap();
        let far = store.index_of("n0").unwrap();
        store.set_position(far, Vec3::new(0.0, 500.0, 0.0)).unwrap();
        let stats = engine.step(&mut store);
        assert_eq!(stats.repulsion_pairs, 0);
    }

    #[test]
    fn test_coincident_nodes_stay_finite() {
        let mut store = chain(2, 9);
        store.set_position(0, Vec3::new(1.0, 1.0, 1.0)).unwrap();
        store.set_position(1, Vec3::new(1.0, 1.0, 1.0)).unwrap();

        let mut engine = LayoutEngine::default();
        engine.run(&mut store, 5);

        assert!(store.positions().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = LayoutEngine::new(LayoutConfig {
            damping: 1.5,
            ..LayoutConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_set_config_validates() {
        let mut engine = LayoutEngine::default();

        let bad = LayoutConfig {
            cell_size: -1.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            engine.set_config(bad),
            Err(ConfigError::InvalidValue { field: "cell_size", .. })
        ));
        assert_eq!(engine.config(), &LayoutConfig::default());

        // A rejected config never reaches the step
        let mut store = chain(3, 5);
        engine.run(&mut store, 3);
        assert!(store.positions().iter().all(|v| v.is_finite()));

        let tuned = LayoutConfig {
            damping: 0.5,
            repulsion_mode: RepulsionMode::AllPairs,
            ..LayoutConfig::default()
        };
        engine.set_config(tuned.clone()).unwrap();
        assert_eq!(engine.config(), &tuned);
    }
}
