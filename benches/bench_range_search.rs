use shared::*;

use criterion::{criterion_group, criterion_main, Criterion};
use rstree_core::rtree::{RTree, RTreeConfig};
use std::hint::black_box;
use tracing::info;

fn build_tree() -> RTree {
    let rects = generate_rects();
    let mut tree = RTree::with_config(RTreeConfig::from_pairs(
        BENCH_NODE_CAPACITY,
        BENCH_MIN_CAPACITY,
    ));
    for (rect, id) in rects {
        tree.add(rect, id);
    }
    tree
}

fn bench_intersects(c: &mut Criterion) {
    let tree = build_tree();
    let query = query_rect();
    info!("benchmarking intersects() on a tree of {} entries", tree.size());

    c.bench_function("rtree_intersects", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            tree.intersects(black_box(&query), |_id| {
                hits += 1;
                true
            });
            black_box(hits);
        });
    });
}

fn bench_contains(c: &mut Criterion) {
    let mut tree = build_tree();
    let query = BENCH_BOUNDARY;

    c.bench_function("rtree_contains", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            tree.contains(black_box(&query), |_id| {
                hits += 1;
                true
            });
            black_box(hits);
        });
    });
}

fn benches_impl(c: &mut Criterion) {
    bench_intersects(c);
    bench_contains(c);
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = benches_impl
}
criterion_main!(benches);
