#![allow(dead_code)]

//! Shared fixtures for the integration test suite: node capacity, a
//! deterministic rectangle generator, and the literal six-rectangle
//! intersection scenario used by both the scenario tests and the property
//! tests.

use rstree_core::geometry::Rect;
use rstree_core::rtree::RTreeConfig;

pub const SMALL_MAX_ENTRIES: usize = 4;
pub const SMALL_MIN_ENTRIES: usize = 2;

pub fn small_config() -> RTreeConfig {
    RTreeConfig::from_pairs(SMALL_MAX_ENTRIES, SMALL_MIN_ENTRIES)
}

/// A small xorshift PRNG so the suite doesn't need `rand` seeded identically
/// across platforms for its deterministic fixtures (the `rand`-based cases
/// live in the proptest module, which carries its own seeding contract).
pub struct Lcg(u32);

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Lcg(seed | 1)
    }

    pub fn next_f32(&mut self, lo: f32, hi: f32) -> f32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        let unit = (self.0 as f64) / (u32::MAX as f64);
        lo + (hi - lo) * unit as f32
    }
}

/// `count` unit rectangles scattered across `[0, bound]^2`, ids `0..count`.
pub fn random_unit_rects(count: i32, bound: f32, seed: u32) -> Vec<(Rect, i32)> {
    let mut rng = Lcg::new(seed);
    (0..count)
        .map(|i| {
            let x = rng.next_f32(0.0, bound - 1.0);
            let y = rng.next_f32(0.0, bound - 1.0);
            (Rect::new(x, y, x + 1.0, y + 1.0), i)
        })
        .collect()
}

/// The six literal rectangles from spec.md's end-to-end intersects scenario,
/// paired with a stable id per rectangle (its index in this list).
pub fn intersection_scenario_rects() -> Vec<(Rect, i32)> {
    vec![
        (Rect::new(0.0, 0.0, 0.0, 0.0), 0),
        (Rect::new(1.0, 1.0, 1.0, 1.0), 1),
        (Rect::new(2.0, 2.0, 6.0, 6.0), 2),
        (Rect::new(3.0, 3.0, 7.0, 5.0), 3),
        (Rect::new(3.0, 3.0, 5.0, 7.0), 4),
        (Rect::new(1.0, 3.0, 5.0, 5.0), 5),
        (Rect::new(3.0, 1.0, 5.0, 5.0), 6),
    ]
}
