use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dominion::core::config::WorldConfig;
use dominion::worldgen::{generate_map_data, generate_world, scatter_sites, voronoi_cells};
use dominion::SeededDice;

fn bench_worldgen(c: &mut Criterion) {
    let mut group = c.benchmark_group("worldgen");

    group.bench_function("elevation_256x256", |b| {
        b.iter(|| {
            let cells = generate_map_data(black_box(42), 256, 256).expect("elevation");
            black_box(cells.len());
        })
    });

    group.bench_function("voronoi_180_sites", |b| {
        let sites = scatter_sites(180, 4000.0, 2600.0, &mut SeededDice::new(7));
        b.iter(|| {
            let cells = voronoi_cells(black_box(&sites), 4000.0, 2600.0).expect("voronoi");
            black_box(cells.len());
        })
    });

    group.sample_size(10);
    group.bench_function("world_default", |b| {
        let config = WorldConfig::default();
        b.iter(|| {
            let map = generate_world(&config, &mut SeededDice::new(7)).expect("world");
            black_box(map.territories.len());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_worldgen);
criterion_main!(benches);
