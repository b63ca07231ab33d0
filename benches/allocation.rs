use blockpool_rs::MemoryPool;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Benchmark filling a pool with first-fit allocations
fn bench_fill_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_fit_fill");

    group.bench_function("4k_blocks_of_1", |b| {
        b.iter(|| {
            let pool = MemoryPool::builder()
                .total_size(4096)
                .block_size(1)
                .build()
                .unwrap();
            for i in 0..128 {
                pool.allocate(&format!("p{}", i), black_box(32)).unwrap();
            }
        });
    });

    group.bench_function("1k_blocks_of_4096", |b| {
        b.iter(|| {
            let pool = MemoryPool::builder()
                .total_size(1024 * 4096)
                .block_size(4096)
                .build()
                .unwrap();
            for i in 0..64 {
                pool.allocate(&format!("p{}", i), black_box(16 * 4096)).unwrap();
            }
        });
    });

    group.finish();
}

/// Benchmark allocate/deallocate cycles over a fragmented table
fn bench_alloc_free_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_free_cycle");

    group.bench_function("interleaved", |b| {
        b.iter(|| {
            let pool = MemoryPool::builder()
                .total_size(4096)
                .block_size(1)
                .build()
                .unwrap();

            for i in 0..64 {
                pool.allocate(&format!("p{}", i), 32).unwrap();
            }
            // Free every other owner, then refill the gaps
            for i in (0..64).step_by(2) {
                pool.deallocate(&format!("p{}", i)).unwrap();
            }
            for i in 0..32 {
                pool.allocate(&format!("q{}", i), black_box(32)).unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_fill_pool, bench_alloc_free_cycle);
criterion_main!(benches);
