//! Benchmarks for heaps, caches, buffers and tries.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use skp_primitives::{Heap, IndexedHeap, LruCache, MetricsBuffer, PrefixTree, RadixTrie, RingBuffer, Trie, TtlLruCache};
use std::time::Duration;
use tokio::runtime::Runtime;

fn bench_heaps(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap");

    for size in [100usize, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("push_pop", size), size, |b, &size| {
            b.iter(|| {
                let mut heap = Heap::min();
                for i in 0..size {
                    heap.push(black_box((i * 7919) % size));
                }
                while let Some(v) = heap.pop() {
                    black_box(v);
                }
            })
        });
    }

    group.bench_function("indexed_update", |b| {
        let mut heap = IndexedHeap::min();
        for i in 0..1_000u64 {
            heap.push(i * 2);
        }
        let mut i = 0u64;
        b.iter(|| {
            // Moves one value between even and odd slots and back
            let old = (i % 1_000) * 2;
            i += 1;
            black_box(heap.update(&old, old + 1)).ok();
            black_box(heap.update(&(old + 1), old)).ok();
        })
    });

    group.finish();
}

fn bench_caches(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cache");

    group.bench_function("lru_get_hit", |b| {
        let cache = LruCache::new(1_000);
        for i in 0..1_000u64 {
            cache.put(i, i);
        }
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            black_box(cache.get(&(i % 1_000)))
        })
    });

    group.bench_function("lru_put_evicting", |b| {
        let cache = LruCache::new(1_000);
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            cache.put(black_box(i), i);
        })
    });

    group.bench_function("ttl_get_hit", |b| {
        // Built inside the runtime so the sweeper runs alongside
        let cache = rt.block_on(async { TtlLruCache::new(1_000, Duration::from_secs(3600)) });
        for i in 0..1_000u64 {
            cache.put(i, i);
        }
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            black_box(cache.get(&(i % 1_000)))
        })
    });

    group.finish();
}

fn bench_buffers(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");

    group.bench_function("ring_write", |b| {
        let buffer = RingBuffer::new(4_096);
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            buffer.write(black_box(i));
        })
    });

    for samples in [100usize, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("metrics_stats", samples), samples, |b, &samples| {
            let metrics = MetricsBuffer::new(samples);
            for i in 0..samples {
                metrics.record((i % 977) as f64);
            }
            b.iter(|| black_box(metrics.stats()))
        });
    }

    group.finish();
}

fn bench_tries(c: &mut Criterion) {
    let words: Vec<String> = (0..5_000).map(|i| format!("user:{:04}:session:{}", i % 1_000, i)).collect();
    let mut group = c.benchmark_group("trie");

    let trie: Trie<usize> = Trie::new();
    let radix: RadixTrie<usize> = RadixTrie::new();
    for (i, word) in words.iter().enumerate() {
        trie.insert_with_value(word, i);
        radix.insert_with_value(word, i);
    }

    let trees: [(&str, &dyn PrefixTree<usize>); 2] = [("trie", &trie), ("radix", &radix)];
    for (name, tree) in trees {
        group.bench_function(BenchmarkId::new("search", name), |b| {
            let mut i = 0usize;
            b.iter(|| {
                i += 1;
                black_box(tree.search_with_value(&words[i % words.len()]))
            })
        });

        group.bench_function(BenchmarkId::new("prefix", name), |b| {
            b.iter(|| black_box(tree.get_all_with_prefix("user:0042")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_heaps, bench_caches, bench_buffers, bench_tries);
criterion_main!(benches);
