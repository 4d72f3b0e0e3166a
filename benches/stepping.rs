use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use voxel_potts::{CellParams, Location, Potts, PottsConfig, Voxel};

fn lattice_sizes() -> Vec<i32> {
    vec![32, 64]
}

/// Square lattice tiled with 8x8 cells, leaving a one-voxel gap of medium.
fn tiled(size: i32) -> Potts {
    let mut potts = Potts::new(PottsConfig::new(size, size, 1)).unwrap();
    let params = CellParams::new(1, 49.0, 28.0)
        .with_lambdas(1.0, 0.1)
        .with_adhesion(vec![8.0, 4.0]);
    for x0 in (0..size - 7).step_by(8) {
        for y0 in (0..size - 7).step_by(8) {
            let voxels = (x0..x0 + 7).flat_map(|x| (y0..y0 + 7).map(move |y| Voxel::new(x, y, 0)));
            potts.add_cell(params.clone(), voxels).unwrap();
        }
    }
    potts
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_2d");
    for &size in &lattice_sizes() {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || (tiled(size), ChaCha8Rng::seed_from_u64(1)),
                |(mut potts, mut rng)| {
                    let stats = potts.step(&mut rng).unwrap();
                    std::hint::black_box(stats);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");
    for &side in &[8, 16] {
        let voxels: Vec<Voxel> = (0..side)
            .flat_map(|x| (0..side).map(move |y| Voxel::new(x, y, 0)))
            .collect();
        let location = Location::from_voxels(voxel_potts::Geometry::Grid2D, voxels);
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &_| {
            b.iter_batched(
                || (location.clone(), ChaCha8Rng::seed_from_u64(2)),
                |(mut location, mut rng)| {
                    let half = location.split(&mut rng);
                    std::hint::black_box(half);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step, bench_split);
criterion_main!(benches);
