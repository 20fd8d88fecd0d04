// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Moving boxes.
//!
//! Bounce boxes around a world for a few frames, updating them in place and
//! counting which ones touch another box each frame.
//!
//! Run:
//! - `cargo run -p understory_examples --example moving_boxes`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;
use understory_loose_tree::{Aabb2D, Key, LooseConfig, LooseTree};

const WORLD: f64 = 800.0;
const SIDE: f64 = 12.0;

struct Mover {
    key: Key,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

impl Mover {
    fn step(&mut self) -> Aabb2D<f64> {
        self.x += self.vx;
        self.y += self.vy;
        if self.x < 0.0 || self.x + SIDE > WORLD {
            self.vx = -self.vx;
            self.x = self.x.clamp(0.0, WORLD - SIDE);
        }
        if self.y < 0.0 || self.y + SIDE > WORLD {
            self.vy = -self.vy;
            self.y = self.y.clamp(0.0, WORLD - SIDE);
        }
        Aabb2D::from_xywh(self.x, self.y, SIDE, SIDE)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut tree: LooseTree<usize> = LooseTree::new(
        Aabb2D::from_xywh(0.0, 0.0, WORLD, WORLD),
        LooseConfig {
            padding: 0.5,
            max_objects: 4,
            ..Default::default()
        },
    )
    .unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let mut movers: Vec<Mover> = (0..200)
        .map(|i| {
            let x = rng.random_range(0.0..WORLD - SIDE);
            let y = rng.random_range(0.0..WORLD - SIDE);
            let key = tree
                .insert(Aabb2D::from_xywh(x, y, SIDE, SIDE), i)
                .unwrap();
            Mover {
                key,
                x,
                y,
                vx: rng.random_range(-3.0..3.0),
                vy: rng.random_range(-3.0..3.0),
            }
        })
        .collect();

    for frame in 0..60 {
        for m in &mut movers {
            let rect = m.step();
            tree.update(m.key, rect).unwrap();
        }
        let touching = movers
            .iter()
            .filter(|m| tree.query_overlapping(m.key).unwrap().next().is_some())
            .count();
        if frame % 10 == 0 {
            tracing::info!(frame, touching, regions = tree.region_count(), "frame");
            println!("frame {frame:>2}: {touching} of {} boxes touching", movers.len());
        }
    }
}
