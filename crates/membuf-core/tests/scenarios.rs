//! End-to-end behavior of the buffered allocator.

mod common;

use std::sync::Arc;

use common::RecordingAllocator;
use membuf_common::Attr;
use membuf_core::{
    Allocator, BufferedAllocator, HeapAllocator, LockedAllocator, Reclaim, TrackingAllocator,
};

#[test]
fn test_over_threshold_flushes_before_allocating() {
    let underlying = Arc::new(RecordingAllocator::default());
    let buffered = BufferedAllocator::new(underlying.clone(), 100);

    let a = buffered.allocate(60, Attr::Default).unwrap();
    let b = buffered.allocate(50, Attr::Default).unwrap();
    let (a_id, b_id) = (a.id(), b.id());
    buffered.free(a);
    buffered.free(b);
    assert_eq!(buffered.cached_bytes(), 110);

    let fresh = buffered.allocate(10, Attr::Default).unwrap();

    assert_ne!(fresh.id(), a_id);
    assert_ne!(fresh.id(), b_id);
    assert_eq!(fresh.size(), 10);
    assert_eq!(underlying.released_sizes(), vec![60, 50]);
    assert_eq!(buffered.cached_bytes(), 0);
    assert_eq!(underlying.allocations(), 3);
}

#[test]
fn test_larger_cached_block_is_reused() {
    let underlying = Arc::new(RecordingAllocator::default());
    let buffered = BufferedAllocator::new(underlying.clone(), -1);

    let block = buffered.allocate(64, Attr::Default).unwrap();
    let id = block.id();
    buffered.free(block);

    let reused = buffered.allocate(32, Attr::Default).unwrap();
    assert_eq!(reused.id(), id);
    assert_eq!(reused.size(), 64);
    assert_eq!(buffered.cached_blocks(), 0);
    assert_eq!(buffered.cached_bytes(), 0);
    assert_eq!(underlying.allocations(), 1);
}

#[test]
fn test_drop_releases_every_cached_block() {
    let underlying = Arc::new(RecordingAllocator::default());
    {
        let buffered = BufferedAllocator::new(underlying.clone(), -1);
        let blocks: Vec<_> = [128, 256, 512]
            .into_iter()
            .map(|size| buffered.allocate(size, Attr::Default).unwrap())
            .collect();
        for block in blocks {
            buffered.free(block);
        }
        assert_eq!(buffered.cached_blocks(), 3);
        assert_eq!(underlying.release_count(), 0);
    }
    assert_eq!(underlying.release_count(), 3);
}

#[test]
fn test_buffered_is_a_drop_in_allocator() {
    let heap = Arc::new(TrackingAllocator::new(HeapAllocator::new()));
    let inner = Arc::new(BufferedAllocator::new(heap.clone(), -1));
    let outer = BufferedAllocator::new(inner.clone(), -1);

    let mut block = outer.allocate(1024, Attr::Tiny).unwrap();
    block.as_mut_slice().unwrap()[0] = 7;
    outer.free(block);

    let again = outer.allocate(1000, Attr::Tiny).unwrap();
    assert_eq!(again.as_slice().unwrap()[0], 7);
    outer.free(again);
    assert_eq!(heap.stats().allocations, 1);

    // Dropping the outer layer parks the block in the inner cache.
    drop(outer);
    assert_eq!(inner.cached_blocks(), 1);
    assert_eq!(heap.stats().frees, 0);

    drop(inner);
    assert_eq!(heap.stats().frees, 1);
}

#[test]
fn test_reclaim_partial_then_all() {
    let underlying = Arc::new(RecordingAllocator::default());
    let buffered = BufferedAllocator::new(underlying.clone(), -1);

    let blocks: Vec<_> = [100, 300, 200, 300]
        .into_iter()
        .map(|size| buffered.allocate(size, Attr::Default).unwrap())
        .collect();
    for block in blocks {
        buffered.free(block);
    }

    assert_eq!(buffered.free_cache(Reclaim::Bytes(301)), 600);
    assert_eq!(underlying.released_sizes(), vec![300, 300]);

    assert_eq!(buffered.free_cache(Reclaim::All), 300);
    assert_eq!(underlying.released_sizes(), vec![300, 300, 200, 100]);
    assert_eq!(buffered.cached_bytes(), 0);
}

#[test]
fn test_concurrent_reuse_keeps_accounting() {
    let heap = Arc::new(TrackingAllocator::new(HeapAllocator::new()));
    let buffered = BufferedAllocator::new(heap.clone(), -1);
    let sizes = [64usize, 256, 1024, 4096];

    std::thread::scope(|s| {
        for t in 0..4 {
            let buffered = &buffered;
            s.spawn(move || {
                for i in 0..250 {
                    let size = sizes[(t + i) % sizes.len()];
                    let block = buffered.allocate(size, Attr::Default).unwrap();
                    assert!(block.size() >= size);
                    buffered.free(block);
                }
            });
        }
    });

    let stats = buffered.stats();
    assert_eq!(stats.hits + stats.misses, 1000);
    assert_eq!(heap.stats().allocations, stats.misses);
    assert_eq!(
        heap.stats().live_bytes,
        stats.cached_bytes,
        "every live heap byte is parked in the cache"
    );

    drop(buffered);
    assert_eq!(heap.stats().live_bytes, 0);
}

#[test]
fn test_locked_heap_under_buffered() {
    let locked = Arc::new(LockedAllocator::new(HeapAllocator::with_capacity(4096)));
    let buffered = BufferedAllocator::new(locked.clone(), 1024);
    assert!(buffered.is_alloc_thread_safe());

    let a = buffered.allocate(2048, Attr::Default).unwrap();
    buffered.free(a);
    assert_eq!(locked.inner().in_use(), 2048);

    // Over the threshold: the cached 2 KiB is flushed before the heap is asked.
    let b = buffered.allocate(3000, Attr::Default).unwrap();
    assert_eq!(locked.inner().in_use(), 3000);
    buffered.free(b);
}
