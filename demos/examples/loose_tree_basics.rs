// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loose tree basics.
//!
//! Fill a 400×400 scene with boxes, query it, dump the regions, then remove
//! everything again and watch the tree collapse.
//!
//! Run:
//! - `cargo run -p understory_examples --example loose_tree_basics`
//! - `RUST_LOG=understory_loose_tree=debug cargo run -p understory_examples --example loose_tree_basics`

use kurbo::Rect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;
use understory_loose_tree::{Aabb2D, Key, LooseConfig, LooseTree};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = LooseConfig {
        padding: 0.25,
        max_objects: 1,
        max_depth: 8,
        cols: 2,
        rows: 2,
    };
    let mut tree: LooseTree<usize> =
        LooseTree::new(Aabb2D::from_xywh(0.0, 0.0, 400.0, 400.0), config).unwrap();
    let full = Aabb2D::new(0.0, 0.0, 400.0, 400.0);

    // Two corner boxes first.
    let mut keys: Vec<Key> = vec![
        tree.insert(Rect::new(0.0, 0.0, 32.0, 32.0).into(), 0).unwrap(),
        tree.insert(Rect::new(368.0, 368.0, 400.0, 400.0).into(), 1)
            .unwrap(),
    ];
    println!("corners: {} hits", tree.query(full).count());

    // Then fifty random 32×32 boxes.
    let mut rng = StdRng::seed_from_u64(400);
    for i in 2..52 {
        let x = rng.random_range(0.0..368.0);
        let y = rng.random_range(0.0..368.0);
        keys.push(tree.insert(Aabb2D::from_xywh(x, y, 32.0, 32.0), i).unwrap());
    }
    println!(
        "size={} live={} regions={} hits={}",
        tree.size(),
        tree.len(),
        tree.region_count(),
        tree.query(full).count()
    );

    let probe = Rect::new(100.0, 100.0, 160.0, 160.0);
    let near: Vec<usize> = tree.query(probe.into()).map(|(_, p)| p).collect();
    println!("boxes touching {probe:?}: {near:?}");

    print!("{}", tree.describe());

    let first = keys[0];
    while let Some(k) = keys.pop() {
        tree.remove(k).unwrap();
        assert_eq!(tree.query(full).count(), keys.len());
    }
    assert!(tree.remove(first).is_err(), "already removed");
    print!("{}", tree.describe());
}
