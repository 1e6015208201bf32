//! Graph Store
//!
//! Owns every node and edge of the graph plus the physics buffers the
//! layout engine integrates.
//!
//! ## Layout
//!
//! Per-slot physics lives in struct-of-arrays `f32` buffers, three floats
//! per slot (`x, y, z`). Slot `i` of `positions`, `velocities` and
//! `forces` belongs to node index `i`. Buffers grow geometrically and
//! growth preserves every existing value.
//!
//! ## Index Rules
//!
//! - Indices are handed out densely starting at 0
//! - Deleting a node leaves its slot in place, inactive, with its last
//!   position frozen
//! - Slots are never reused until [`GraphStore::clear_graph`]

use std::collections::{HashMap, HashSet, VecDeque};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::core::{compute_graph_digest, env_override, ConfigError, DeterministicRng, GraphDigest, Vec3};
use crate::game::{GameStateMeta, Mark, Move, NodeRole, Palette};
use super::events::GraphEvent;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Initial node slot capacity.
pub const DEFAULT_NODE_CAPACITY: usize = 10_000;

/// Initial edge capacity.
pub const DEFAULT_EDGE_CAPACITY: usize = 20_000;

/// Capacity multiplier applied when a buffer fills up.
pub const GROWTH_FACTOR: f64 = 1.8;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Default bound on undrained events; a full build queues 21,645.
pub const DEFAULT_EVENT_CAPACITY: usize = 65_536;

/// Next capacity after `capacity` is exhausted.
pub fn grown_capacity(capacity: usize) -> usize {
    let grown = (capacity as f64 * GROWTH_FACTOR).ceil() as usize;
    grown.max(capacity + 1)
}

// =============================================================================
// ERRORS
// =============================================================================

/// Rejected store operations. A rejected operation leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An active node already has this name.
    #[error("node {0:?} already exists")]
    DuplicateName(String),

    /// The unordered pair is already connected.
    #[error("edge {a:?} <-> {b:?} already exists")]
    DuplicateEdge {
        /// First name as passed
        a: String,
        /// Second name as passed
        b: String,
    },

    /// An edge names a node that is not active.
    #[error("edge endpoint {0:?} does not exist")]
    MissingEndpoint(String),

    /// Both endpoints are the same node.
    #[error("node {0:?} cannot be connected to itself")]
    SelfLoop(String),

    /// No active node has this name.
    #[error("unknown node {0:?}")]
    UnknownNode(String),

    /// Slot is out of range or deleted.
    #[error("no active node at index {0}")]
    UnknownIndex(usize),

    /// Random connection needs two candidates.
    #[error("need at least 2 active nodes, have {0}")]
    NotEnoughNodes(usize),
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Store construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Initial node slot capacity
    pub node_capacity: usize,
    /// Initial edge capacity
    pub edge_capacity: usize,
    /// Seed for initial positions and random connections
    pub seed: u64,
    /// Role to color mapping for builder-created nodes
    pub palette: Palette,
    /// Undrained events kept before the oldest are dropped
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            edge_capacity: DEFAULT_EDGE_CAPACITY,
            seed: DEFAULT_SEED,
            palette: Palette::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by any `GRAPH_*` variables that are set.
    ///
    /// A variable that is set but does not parse is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        env_override("GRAPH_NODE_CAPACITY", &mut config.node_capacity)?;
        env_override("GRAPH_EDGE_CAPACITY", &mut config.edge_capacity)?;
        env_override("GRAPH_SEED", &mut config.seed)?;
        env_override("GRAPH_EVENT_CAPACITY", &mut config.event_capacity)?;
        Ok(config)
    }
}

// =============================================================================
// NODES AND EDGES
// =============================================================================

/// Identity and presentation of a node slot.
///
/// Physics state is not stored here; see [`GraphStore::position`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Slot index
    pub index: usize,
    /// Unique name (board key for state-space nodes)
    pub name: String,
    /// Packed `0xRRGGBB`
    pub color: u32,
    /// False once deleted
    pub active: bool,
    /// Game metadata; interactively added nodes carry none
    pub state: Option<GameStateMeta>,
}

/// Undirected connection between two active nodes, stored with `a < b`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Lower endpoint index
    pub a: usize,
    /// Higher endpoint index
    pub b: usize,
    /// Endpoint the edge was added from
    pub origin: usize,
    /// Move that produced the transition
    pub mv: Option<Move>,
    /// Mark placed by that move
    pub player: Option<Mark>,
}

impl Edge {
    /// The endpoint opposite `index`.
    #[inline]
    pub fn other(&self, index: usize) -> usize {
        if self.a == index { self.b } else { self.a }
    }

    /// True if `index` is one of the endpoints.
    #[inline]
    pub fn touches(&self, index: usize) -> bool {
        self.a == index || self.b == index
    }

    /// Endpoint the edge points to, as added.
    #[inline]
    pub fn target(&self) -> usize {
        self.other(self.origin)
    }
}

/// Split borrow handed to the layout engine for one step.
pub(crate) struct PhysicsView<'a> {
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
    pub positions: &'a mut [f32],
    pub velocities: &'a mut [f32],
    pub forces: &'a mut [f32],
}

// =============================================================================
// GRAPH STORE
// =============================================================================

/// The graph: nodes, edges, adjacency, physics buffers and selection.
#[derive(Debug)]
pub struct GraphStore {
    config: StoreConfig,
    rng: DeterministicRng,

    nodes: Vec<Node>,
    name_to_index: HashMap<String, usize>,
    /// Outgoing neighbours per slot, in insertion order
    adjacency: Vec<Vec<usize>>,

    positions: Vec<f32>,
    velocities: Vec<f32>,
    forces: Vec<f32>,
    node_capacity: usize,

    edges: Vec<Edge>,
    edge_set: HashSet<(usize, usize)>,
    edge_capacity: usize,

    selected: Option<usize>,
    pending_events: VecDeque<GraphEvent>,
    dropped_events: u64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl GraphStore {
    /// Create an empty store.
    pub fn new(config: StoreConfig) -> Self {
        let node_capacity = config.node_capacity;
        let edge_capacity = config.edge_capacity;
        Self {
            rng: DeterministicRng::new(config.seed),
            nodes: Vec::with_capacity(node_capacity),
            name_to_index: HashMap::with_capacity(node_capacity),
            adjacency: Vec::with_capacity(node_capacity),
            positions: vec![0.0; node_capacity * 3],
            velocities: vec![0.0; node_capacity * 3],
            forces: vec![0.0; node_capacity * 3],
            node_capacity,
            edges: Vec::with_capacity(edge_capacity),
            edge_set: HashSet::with_capacity(edge_capacity),
            edge_capacity,
            selected: None,
            pending_events: VecDeque::new(),
            dropped_events: 0,
            config,
        }
    }

    /// Store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Palette for builder-created nodes.
    pub fn palette(&self) -> &Palette {
        &self.config.palette
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Allocate a node at the next slot.
    ///
    /// The node starts on a ring around the origin whose radius grows with
    /// the active node count, with zero velocity and force.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        color: u32,
        state: Option<GameStateMeta>,
    ) -> Result<usize, GraphError> {
        let name = name.into();
        if self.name_to_index.contains_key(&name) {
            debug!("Rejected duplicate node {}", name);
            return Err(GraphError::DuplicateName(name));
        }

        if self.nodes.len() >= self.node_capacity {
            self.grow_nodes();
        }

        let index = self.nodes.len();
        let position = self.rng.ring_position(self.name_to_index.len() + 1);
        position.write_slot(&mut self.positions, index);
        Vec3::ZERO.write_slot(&mut self.velocities, index);
        Vec3::ZERO.write_slot(&mut self.forces, index);

        self.nodes.push(Node {
            index,
            name: name.clone(),
            color,
            active: true,
            state,
        });
        self.adjacency.push(Vec::new());
        self.name_to_index.insert(name.clone(), index);

        self.push_event(GraphEvent::NodeAdded { index, name });
        Ok(index)
    }

    /// Connect two active nodes.
    ///
    /// The pair is stored as `(min, max)`; `b` is appended to `a`'s
    /// outgoing adjacency.
    pub fn add_edge(
        &mut self,
        a: &str,
        b: &str,
        mv: Option<Move>,
        player: Option<Mark>,
    ) -> Result<(), GraphError> {
        let from = self.endpoint(a)?;
        let to = self.endpoint(b)?;

        if from == to {
            debug!("Rejected self-loop on {}", a);
            return Err(GraphError::SelfLoop(a.to_string()));
        }

        let key = (from.min(to), from.max(to));
        if self.edge_set.contains(&key) {
            debug!("Rejected duplicate edge {} <-> {}", a, b);
            return Err(GraphError::DuplicateEdge {
                a: a.to_string(),
                b: b.to_string(),
            });
        }

        if self.edges.len() >= self.edge_capacity {
            self.grow_edges();
        }

        self.edges.push(Edge {
            a: key.0,
            b: key.1,
            origin: from,
            mv,
            player,
        });
        self.edge_set.insert(key);
        self.adjacency[from].push(to);

        self.push_event(GraphEvent::EdgeAdded { a: key.0, b: key.1 });
        Ok(())
    }

    /// Deactivate a node and drop every edge touching it.
    ///
    /// Returns the number of edges removed.
    pub fn delete_node(&mut self, name: &str) -> Result<usize, GraphError> {
        let index = match self.name_to_index.remove(name) {
            Some(index) => index,
            None => {
                debug!("Rejected delete of unknown node {}", name);
                return Err(GraphError::UnknownNode(name.to_string()));
            }
        };

        let mut others = Vec::new();
        self.edges.retain(|edge| {
            if edge.touches(index) {
                others.push(edge.other(index));
                false
            } else {
                true
            }
        });

        for &other in &others {
            self.edge_set.remove(&(index.min(other), index.max(other)));
            self.adjacency[other].retain(|&n| n != index);
        }
        self.adjacency[index].clear();

        self.nodes[index].active = false;
        Vec3::ZERO.write_slot(&mut self.velocities, index);
        Vec3::ZERO.write_slot(&mut self.forces, index);

        let edges_removed = others.len();
        self.push_event(GraphEvent::NodeDeleted {
            index,
            name: name.to_string(),
            edges_removed,
        });

        if self.selected == Some(index) {
            self.set_selected(None);
        }

        Ok(edges_removed)
    }

    /// Drop all nodes and edges. Indices restart at 0; grown capacity is kept.
    pub fn clear_graph(&mut self) {
        let nodes = self.name_to_index.len();
        let edges = self.edges.len();

        self.nodes.clear();
        self.name_to_index.clear();
        self.adjacency.clear();
        self.edges.clear();
        self.edge_set.clear();
        self.positions.fill(0.0);
        self.velocities.fill(0.0);
        self.forces.fill(0.0);
        self.selected = None;

        self.push_event(GraphEvent::Cleared { nodes, edges });
    }

    /// Replace the game metadata of a node.
    pub fn set_state(&mut self, index: usize, state: GameStateMeta) -> Result<(), GraphError> {
        let node = self.active_node_mut(index)?;
        node.state = Some(state);
        Ok(())
    }

    /// Move a node, e.g. when the user drags it.
    pub fn set_position(&mut self, index: usize, position: Vec3) -> Result<(), GraphError> {
        self.active_node_mut(index)?;
        position.write_slot(&mut self.positions, index);
        Ok(())
    }

    /// Connect two distinct random active nodes.
    ///
    /// Returns the connected names. Fails with `DuplicateEdge` if the pair
    /// is already connected.
    pub fn connect_random_nodes(&mut self) -> Result<(String, String), GraphError> {
        let active: Vec<usize> = self.nodes.iter().filter(|n| n.active).map(|n| n.index).collect();
        if active.len() < 2 {
            return Err(GraphError::NotEnoughNodes(active.len()));
        }

        let first = self.rng.next_index(active.len());
        let mut second = self.rng.next_index(active.len() - 1);
        if second >= first {
            second += 1;
        }

        let a = self.nodes[active[first]].name.clone();
        let b = self.nodes[active[second]].name.clone();
        self.add_edge(&a, &b, None, None)?;
        Ok((a, b))
    }

    fn endpoint(&self, name: &str) -> Result<usize, GraphError> {
        match self.name_to_index.get(name) {
            Some(&index) => Ok(index),
            None => {
                debug!("Rejected edge with missing endpoint {}", name);
                Err(GraphError::MissingEndpoint(name.to_string()))
            }
        }
    }

    fn active_node_mut(&mut self, index: usize) -> Result<&mut Node, GraphError> {
        match self.nodes.get_mut(index) {
            Some(node) if node.active => Ok(node),
            _ => Err(GraphError::UnknownIndex(index)),
        }
    }

    fn grow_nodes(&mut self) {
        let capacity = grown_capacity(self.node_capacity);
        self.positions.resize(capacity * 3, 0.0);
        self.velocities.resize(capacity * 3, 0.0);
        self.forces.resize(capacity * 3, 0.0);
        self.nodes.reserve(capacity - self.nodes.len());
        self.adjacency.reserve(capacity - self.adjacency.len());
        debug!("Node capacity {} -> {}", self.node_capacity, capacity);
        self.node_capacity = capacity;
    }

    fn grow_edges(&mut self) {
        let capacity = grown_capacity(self.edge_capacity);
        self.edges.reserve(capacity - self.edges.len());
        debug!("Edge capacity {} -> {}", self.edge_capacity, capacity);
        self.edge_capacity = capacity;
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Select an active node.
    pub fn select(&mut self, index: usize) -> Result<(), GraphError> {
        self.active_node_mut(index)?;
        self.set_selected(Some(index));
        Ok(())
    }

    /// Select `index`, or deselect it if it is already selected.
    ///
    /// Returns the selection afterwards.
    pub fn toggle_select(&mut self, index: usize) -> Result<Option<usize>, GraphError> {
        if self.selected == Some(index) {
            self.set_selected(None);
        } else {
            self.select(index)?;
        }
        Ok(self.selected)
    }

    /// Currently selected index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.set_selected(None);
    }

    /// Delete the selected node. `Ok(None)` if nothing is selected.
    pub fn delete_selected(&mut self) -> Result<Option<usize>, GraphError> {
        let Some(index) = self.selected else {
            return Ok(None);
        };
        let name = self.nodes[index].name.clone();
        self.delete_node(&name).map(Some)
    }

    fn set_selected(&mut self, current: Option<usize>) {
        if self.selected == current {
            return;
        }
        let previous = std::mem::replace(&mut self.selected, current);
        self.push_event(GraphEvent::SelectionChanged { previous, current });
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Slots in use, including inactive ones.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes not deleted.
    pub fn active_node_count(&self) -> usize {
        self.name_to_index.len()
    }

    /// Edges between active nodes.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Current node slot capacity.
    pub fn node_capacity(&self) -> usize {
        self.node_capacity
    }

    /// Current edge capacity.
    pub fn edge_capacity(&self) -> usize {
        self.edge_capacity
    }

    /// All slots in index order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Active nodes in index order.
    pub fn active_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.active)
    }

    /// Node at a slot, active or not.
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Canonical `(a, b)` of an edge.
    pub fn edge_endpoints(&self, edge: usize) -> Option<(usize, usize)> {
        self.edges.get(edge).map(|e| (e.a, e.b))
    }

    /// True if the unordered pair is connected.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edge_set.contains(&(a.min(b), a.max(b)))
    }

    /// Slot of an active node.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Name of a slot, active or not.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(|n| n.name.as_str())
    }

    /// True if an active node has this name.
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// True if the slot holds an active node.
    pub fn is_active(&self, index: usize) -> bool {
        self.nodes.get(index).is_some_and(|n| n.active)
    }

    /// Position of a slot.
    pub fn position(&self, index: usize) -> Option<Vec3> {
        (index < self.nodes.len()).then(|| Vec3::from_slot(&self.positions, index))
    }

    /// Velocity of a slot.
    pub fn velocity(&self, index: usize) -> Option<Vec3> {
        (index < self.nodes.len()).then(|| Vec3::from_slot(&self.velocities, index))
    }

    /// Accumulated force of a slot from the last layout step.
    pub fn force(&self, index: usize) -> Option<Vec3> {
        (index < self.nodes.len()).then(|| Vec3::from_slot(&self.forces, index))
    }

    /// Packed color of a slot.
    pub fn color(&self, index: usize) -> Option<u32> {
        self.nodes.get(index).map(|n| n.color)
    }

    /// Game metadata of a slot.
    pub fn state(&self, index: usize) -> Option<&GameStateMeta> {
        self.nodes.get(index).and_then(|n| n.state.as_ref())
    }

    /// Role derived from the slot's metadata.
    pub fn role(&self, index: usize) -> Option<NodeRole> {
        self.state(index).map(GameStateMeta::role)
    }

    /// Outgoing neighbours of a node, in insertion order.
    pub fn adjacent(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.index_of(name)?;
        Some(
            self.adjacency[index]
                .iter()
                .map(|&n| self.nodes[n].name.as_str())
                .collect(),
        )
    }

    /// Every node sharing an edge with `name`, in either direction.
    pub fn neighbors(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.index_of(name)?;
        Some(
            self.edges
                .iter()
                .filter(|e| e.touches(index))
                .map(|e| self.nodes[e.other(index)].name.as_str())
                .collect(),
        )
    }

    /// Flat `x, y, z` positions for slots `[0, node_count)`.
    pub fn positions(&self) -> &[f32] {
        &self.positions[..self.nodes.len() * 3]
    }

    /// Flat `x, y, z` velocities for slots `[0, node_count)`.
    pub fn velocities(&self) -> &[f32] {
        &self.velocities[..self.nodes.len() * 3]
    }

    /// Packed colors for slots `[0, node_count)`.
    pub fn colors(&self) -> Vec<u32> {
        self.nodes.iter().map(|n| n.color).collect()
    }

    /// Write both endpoints of every edge, 6 floats per edge.
    pub fn edge_segments(&self, out: &mut Vec<f32>) {
        out.clear();
        out.reserve(self.edges.len() * 6);
        for edge in &self.edges {
            out.extend_from_slice(&Vec3::from_slot(&self.positions, edge.a).to_array());
            out.extend_from_slice(&Vec3::from_slot(&self.positions, edge.b).to_array());
        }
    }

    /// Topology digest over sorted active names and sorted edge name pairs.
    ///
    /// Independent of insertion order, slot layout and positions.
    pub fn digest(&self) -> GraphDigest {
        let mut names: Vec<&str> = self.name_to_index.keys().map(String::as_str).collect();
        names.sort_unstable();

        let mut pairs: Vec<(&str, &str)> = self
            .edges
            .iter()
            .map(|e| {
                let x = self.nodes[e.a].name.as_str();
                let y = self.nodes[e.b].name.as_str();
                if x <= y { (x, y) } else { (y, x) }
            })
            .collect();
        pairs.sort_unstable();

        compute_graph_digest(names.len(), pairs.len(), |h| {
            for name in &names {
                h.update_str(name);
            }
            for (x, y) in &pairs {
                h.update_str(x);
                h.update_str(y);
            }
        })
    }

    /// Drain committed mutations since the last call.
    ///
    /// Call once per frame. At most `event_capacity` events are kept
    /// between drains; older ones are dropped and counted in
    /// [`GraphStore::dropped_events`].
    pub fn take_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.pending_events).into()
    }

    /// Events discarded because the queue was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    fn push_event(&mut self, event: GraphEvent) {
        if self.config.event_capacity == 0 {
            self.dropped_events += 1;
            return;
        }
        if self.pending_events.len() >= self.config.event_capacity {
            self.pending_events.pop_front();
            self.dropped_events += 1;
        }
        self.pending_events.push_back(event);
    }

    pub(crate) fn physics_mut(&mut self) -> PhysicsView<'_> {
        let len = self.nodes.len() * 3;
        PhysicsView {
            nodes: &self.nodes,
            edges: &self.edges,
            positions: &mut self.positions[..len],
            velocities: &mut self.velocities[..len],
            forces: &mut self.forces[..len],
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
