// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_loose_tree::{Aabb2D, LooseConfig, LooseTree};

const WORLD: f64 = 2048.0;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn world(config: LooseConfig) -> LooseTree<u32> {
    LooseTree::new(Aabb2D::from_xywh(0.0, 0.0, WORLD, WORLD), config).unwrap()
}

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::from_xywh(x0, y0, cell * 0.8, cell * 0.8));
        }
    }
    out
}

fn gen_random_rects(count: usize, rect_w: f64, rect_h: f64, seed: u64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(seed);
    for _ in 0..count {
        let x0 = rng.next_f64() * (WORLD - rect_w);
        let y0 = rng.next_f64() * (WORLD - rect_h);
        out.push(Aabb2D::from_xywh(x0, y0, rect_w, rect_h));
    }
    out
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((
            spread + rng.next_f64() * (WORLD - 2.0 * spread),
            spread + rng.next_f64() * (WORLD - 2.0 * spread),
        ));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Aabb2D::from_xywh(cx + dx, cy + dy, 12.0, 12.0));
        }
    }
    out
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, WORLD / n as f64);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter_batched(
                || world(LooseConfig::default()),
                |mut tree| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        tree.insert(r, i as u32).unwrap();
                    }
                    black_box(tree.region_count());
                },
                BatchSize::SmallInput,
            )
        });
    }
    let rects = gen_clustered_rects(16, 256, 64.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("clustered", |b| {
        b.iter_batched(
            || world(LooseConfig::default()),
            |mut tree| {
                for (i, r) in rects.iter().copied().enumerate() {
                    tree.insert(r, i as u32).unwrap();
                }
                black_box(tree.region_count());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let rects = gen_random_rects(4096, 32.0, 32.0, 0xCAFE_F00D_DEAD_BEEF);
    for &max_objects in &[1usize, 4, 16] {
        let mut tree = world(LooseConfig {
            max_objects,
            ..Default::default()
        });
        let keys: Vec<_> = rects
            .iter()
            .copied()
            .enumerate()
            .map(|(i, r)| tree.insert(r, i as u32).unwrap())
            .collect();
        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_function(format!("all_neighbours_max_objects{}", max_objects), |b| {
            b.iter(|| {
                let mut pairs = 0usize;
                for &k in &keys {
                    pairs += tree.query_overlapping(k).unwrap().count();
                }
                black_box(pairs)
            })
        });
        group.bench_function(format!("viewport_max_objects{}", max_objects), |b| {
            b.iter(|| {
                let hits = tree
                    .query(Aabb2D::from_xywh(512.0, 512.0, 640.0, 360.0))
                    .count();
                black_box(hits)
            })
        });
    }
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    let rects = gen_random_rects(4096, 16.0, 16.0, 0xFACE_FEED_CAFE_BABE);
    let mut tree = world(LooseConfig::default());
    let keys: Vec<_> = rects
        .iter()
        .copied()
        .enumerate()
        .map(|(i, r)| tree.insert(r, i as u32).unwrap())
        .collect();
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let mut frame = rects.clone();
    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("jitter_update", |b| {
        b.iter(|| {
            for (k, r) in keys.iter().zip(frame.iter_mut()) {
                let dx = (rng.next_f64() - 0.5) * 4.0;
                let dy = (rng.next_f64() - 0.5) * 4.0;
                let moved = Aabb2D::from_xywh(
                    (r.min_x + dx).clamp(0.0, WORLD - 16.0),
                    (r.min_y + dy).clamp(0.0, WORLD - 16.0),
                    16.0,
                    16.0,
                );
                tree.update(*k, moved).unwrap();
                *r = moved;
            }
            black_box(tree.len())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_query, bench_churn);
criterion_main!(benches);
