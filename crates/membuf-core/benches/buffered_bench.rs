//! Buffered versus direct heap allocation in an iterative workload.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use membuf_common::Attr;
use membuf_core::{Allocator, BufferedAllocator, HeapAllocator};

const SIZES: [usize; 4] = [4 * 1024, 64 * 1024, 256 * 1024, 1024 * 1024];

fn step(allocator: &dyn Allocator) {
    let blocks: Vec<_> = SIZES
        .iter()
        .map(|&size| allocator.allocate(size, Attr::FluxHuge).unwrap())
        .collect();
    for block in blocks {
        allocator.free(black_box(block));
    }
}

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");

    let heap = HeapAllocator::new();
    group.bench_function(BenchmarkId::new("heap", SIZES.len()), |b| {
        b.iter(|| step(&heap));
    });

    let buffered = BufferedAllocator::new(Arc::new(HeapAllocator::new()), -1);
    group.bench_function(BenchmarkId::new("buffered", SIZES.len()), |b| {
        b.iter(|| step(&buffered));
    });

    group.finish();
}

fn bench_reclaim(c: &mut Criterion) {
    c.bench_function("reclaim_all_64_blocks", |b| {
        let buffered = BufferedAllocator::new(Arc::new(HeapAllocator::new()), -1);
        b.iter(|| {
            let blocks: Vec<_> = (1..=64)
                .map(|i| buffered.allocate(i * 512, Attr::Default).unwrap())
                .collect();
            for block in blocks {
                buffered.free(block);
            }
            black_box(buffered.free_cache(membuf_core::Reclaim::All))
        });
    });
}

criterion_group!(benches, bench_iteration, bench_reclaim);
criterion_main!(benches);
