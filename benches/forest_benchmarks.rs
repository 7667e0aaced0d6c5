use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use reachforest::{
    Config, Coordinate, PredictiveForest, Region, RoadNetwork, ShortestPathTreeBuilder,
    TreeBuilder,
};
use std::sync::Arc;

const SPACING: f64 = 0.001;

fn lattice(n: i64, grid_size: usize) -> RoadNetwork {
    let mut builder = RoadNetwork::builder().grid_size(grid_size);
    for row in 0..n {
        for col in 0..n {
            builder.add_node(
                row * n + col,
                Coordinate::new(40.0 + row as f64 * SPACING, -74.0 + col as f64 * SPACING),
            );
        }
    }

    let mut edge = 0;
    for row in 0..n {
        for col in 0..n {
            let id = row * n + col;
            if col + 1 < n {
                builder.add_edge(edge, id, id + 1).add_edge(edge + 1, id + 1, id);
                edge += 2;
            }
            if row + 1 < n {
                builder.add_edge(edge, id, id + n).add_edge(edge + 1, id + n, id);
                edge += 2;
            }
        }
    }
    builder.build().unwrap()
}

fn benchmark_network_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("network_build");
    group.sample_size(20);

    for size in [20, 50, 100] {
        group.bench_with_input(BenchmarkId::new("lattice", size), &size, |b, &size| {
            b.iter(|| lattice(black_box(size), 50))
        });
    }

    group.finish();
}

fn benchmark_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookups");
    let network = lattice(60, 50);

    group.bench_function("nearest", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            let step = (counter % 600) as f64 * 0.0001;
            counter += 1;
            network.nearest(black_box(40.0 + step), black_box(-74.0 + step))
        })
    });

    for radius in [0.1, 0.3, 0.6] {
        group.bench_with_input(
            BenchmarkId::new("neighbors_within", radius),
            &radius,
            |b, &radius| b.iter(|| network.neighbors_within(black_box(1830), radius)),
        );
    }

    group.finish();
}

fn benchmark_tree_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_expansion");
    let network = lattice(60, 50);
    let builder = ShortestPathTreeBuilder::new();

    for range in [0.5, 1.0, 2.0] {
        group.bench_with_input(BenchmarkId::new("shortest_path", range), &range, |b, &range| {
            b.iter(|| builder.build(&network, black_box(1830), range, 0.0).len())
        });
    }

    group.finish();
}

fn benchmark_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");
    let network = Arc::new(lattice(60, 50));
    let config = Config::default().with_time_range(0.8);
    let start = *network.node(1830).unwrap().location();

    group.bench_function("rebuild", |b| {
        b.iter(|| {
            let mut forest = PredictiveForest::new(network.clone(), &config);
            forest.predict(black_box(Region::new(start, 0.2))).unwrap()
        })
    });

    // The object walks east one block per observation
    group.bench_function("walk_updates", |b| {
        b.iter(|| {
            let mut forest = PredictiveForest::new(network.clone(), &config);
            for step in 0..10 {
                let id = 1830 + step;
                let location = *network.node(id).unwrap().location();
                forest.predict(Region::new(location, 0.05)).unwrap();
            }
            forest.stats()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_network_build,
    benchmark_lookups,
    benchmark_tree_expansion,
    benchmark_predict
);
criterion_main!(benches);
