use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use voronoi_grid_core::{corner_seeds, random_seeds, ComputeBackend, CpuBackend};

fn bench_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign_modes");
    for size in [128u32, 256, 512] {
        let seeds = corner_seeds(size);
        group.throughput(Throughput::Elements(size as u64 * size as u64));

        group.bench_with_input(BenchmarkId::new("sequential", size), &size, |b, &size| {
            let mut backend = CpuBackend::sequential();
            b.iter(|| backend.assign(black_box(size), black_box(&seeds)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("parallel", size), &size, |b, &size| {
            let mut backend = CpuBackend::new();
            b.iter(|| backend.assign(black_box(size), black_box(&seeds)).unwrap());
        });
    }
    group.finish();
}

// Cost grows linearly in the seed count for a fixed grid
fn bench_seed_count_scaling(c: &mut Criterion) {
    let size = 256u32;
    let mut group = c.benchmark_group("assign_seed_count");
    for count in [4usize, 16, 64, 256] {
        let seeds = random_seeds(count, size, 0);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &seeds, |b, seeds| {
            let mut backend = CpuBackend::new();
            b.iter(|| backend.assign(black_box(size), black_box(seeds)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_modes, bench_seed_count_scaling);
criterion_main!(benches);
