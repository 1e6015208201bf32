//! Tic-Tac-Toe State Graph
//!
//! Demo driver: builds the state space, runs the layout for a while and
//! checks that BFS and DFS builds agree.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ttt_graph::{
    build_state_space, Board, FrameCounter, GraphStore, LayoutConfig, LayoutEngine, StoreConfig,
    Traversal, REACHABLE_STATES, TICK_RATE, UNBOUNDED, VERSION,
};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("TTT State Graph v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let traversal: Traversal = env_or("TTT_TRAVERSAL", Traversal::Bfs)?;
    let max_nodes: usize = env_or("TTT_MAX_NODES", UNBOUNDED)?;
    let ticks: u32 = env_or("TTT_TICKS", TICK_RATE * 5)?;

    let layout_config = LayoutConfig::from_env().context("loading layout config")?;
    let store_config = StoreConfig::from_env().context("loading store config")?;

    info!("Traversal: {}", traversal);
    info!("Seed: {}", store_config.seed);
    info!(
        "Physics: strength {}, repulsion {}, attraction {}, damping {}, mode {}",
        layout_config.force_strength,
        layout_config.repulsion_force,
        layout_config.attraction_force,
        layout_config.damping,
        layout_config.repulsion_mode
    );

    demo(traversal, max_nodes, ticks, layout_config, store_config)
}

/// Build, lay out and verify the state graph.
fn demo(
    traversal: Traversal,
    max_nodes: usize,
    ticks: u32,
    layout_config: LayoutConfig,
    store_config: StoreConfig,
) -> Result<()> {
    info!("=== Building State Space ===");

    let mut store = GraphStore::new(store_config.clone());
    let report = build_state_space(&mut store, traversal, max_nodes);
    info!(
        "{} nodes, {} edges, {} terminal",
        store.active_node_count(),
        store.edge_count(),
        report.terminal
    );
    let events = store.take_events();
    info!("{} graph events queued", events.len());

    if let Some(sample) = store.active_nodes().last() {
        if let Ok(board) = Board::from_key(&sample.name) {
            info!("Last discovered position ({}):\n{}", sample.name, board.display());
        }
    }

    info!("=== Running {} Layout Ticks ===", ticks);

    let mut engine = LayoutEngine::new(layout_config).context("invalid layout config")?;
    let mut frames = FrameCounter::new(Instant::now());
    let mut segments = Vec::new();

    for t in 0..ticks {
        let stats = engine.step(&mut store);
        // Stand-in for the renderer's per-frame read
        store.edge_segments(&mut segments);

        if let Some(fps) = frames.tick(Instant::now()) {
            info!(
                "Tick {}: {} fps, {} repulsion pairs, energy {:.4}",
                t, fps, stats.repulsion_pairs, stats.kinetic_energy
            );
        }
        if t % TICK_RATE == 0 {
            info!("Tick {}: energy {:.4}", t, stats.kinetic_energy);
        }
    }
    info!("Final energy: {:.4}", ttt_graph::kinetic_energy(&store));

    let digest = store.digest();
    info!("Graph Digest: {}", hex::encode(digest));

    info!("=== Verifying Traversal Independence ===");
    let other = traversal.opposite();
    let mut replay = GraphStore::new(store_config);
    build_state_space(&mut replay, other, max_nodes);
    let replay_digest = replay.digest();
    info!("{} Digest: {}", other, hex::encode(replay_digest));

    if digest == replay_digest {
        info!("VERIFIED: {} and {} builds match", traversal, other);
    } else if max_nodes < REACHABLE_STATES {
        // Capped builds stop at different frontiers
        warn!("Digests differ under a cap of {} nodes", max_nodes);
    } else {
        bail!("{} and {} builds differ", traversal, other);
    }

    Ok(())
}

/// Parse an environment variable, or use `default` if unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}={:?}: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}
