use ttt_graph::{
    build_state_space, GraphStore, LayoutConfig, LayoutEngine, RepulsionMode, Traversal, UNBOUNDED,
};

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(2));
    targets =
        building_full_state_space,
        stepping_full_graph_grid,
        stepping_small_graph_all_pairs,
}

fn building_full_state_space(c: &mut criterion::Criterion) {
    c.bench_function("build all 5478 states (BFS)", |b| {
        b.iter(|| {
            let mut store = GraphStore::default();
            build_state_space(&mut store, Traversal::Bfs, UNBOUNDED)
        })
    });
}

fn stepping_full_graph_grid(c: &mut criterion::Criterion) {
    let mut store = GraphStore::default();
    build_state_space(&mut store, Traversal::Bfs, UNBOUNDED);
    let mut engine = LayoutEngine::default();
    c.bench_function("layout tick, full graph, grid", |b| {
        b.iter(|| engine.step(&mut store))
    });
}

fn stepping_small_graph_all_pairs(c: &mut criterion::Criterion) {
    let mut store = GraphStore::default();
    build_state_space(&mut store, Traversal::Bfs, 500);
    let config = LayoutConfig {
        repulsion_mode: RepulsionMode::AllPairs,
        ..LayoutConfig::default()
    };
    let Ok(mut engine) = LayoutEngine::new(config) else {
        return;
    };
    c.bench_function("layout tick, 500 nodes, all pairs", |b| {
        b.iter(|| engine.step(&mut store))
    });
}
