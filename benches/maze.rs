use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use party_games::{GameRng, Maze};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("maze_generate");
    for size in [15usize, 31, 63] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = GameRng::new(7);
            b.iter(|| Maze::generate(black_box(size), &mut rng));
        });
    }
    group.finish();
}

fn bench_shortest_path(c: &mut Criterion) {
    let maze = Maze::generate(31, &mut GameRng::new(7));
    c.bench_function("maze_shortest_path_31", |b| {
        b.iter(|| black_box(&maze).shortest_path_len())
    });
}

fn bench_tank_walls(c: &mut Criterion) {
    c.bench_function("carve_cells_12x8", |b| {
        let mut rng = GameRng::new(3);
        b.iter(|| Maze::carve_cells(black_box(12), black_box(8), &mut rng));
    });
}

criterion_group!(benches, bench_generate, bench_shortest_path, bench_tank_walls);
criterion_main!(benches);
