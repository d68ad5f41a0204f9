//! Seed type and seed-set constructors.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A fixed reference point in the grid. Cells are labeled with the index
/// of their nearest seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    pub x: f64,
    pub y: f64,
}

impl Seed {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to grid cell (i, j)
    #[inline]
    pub fn dist_sq(&self, i: u32, j: u32) -> f64 {
        let dx = self.x - i as f64;
        let dy = self.y - j as f64;
        dx * dx + dy * dy
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Seed {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Seed {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x: x as f64, y: y as f64 }
    }
}

/// The classic four-corner layout: one seed at each corner of a
/// `size` x `size` grid, in the order (0,0), (0,size-1),
/// (size-1,size-1), (size-1,0).
pub fn corner_seeds(size: u32) -> Vec<Seed> {
    let hi = size.saturating_sub(1) as f64;
    vec![
        Seed::new(0.0, 0.0),
        Seed::new(0.0, hi),
        Seed::new(hi, hi),
        Seed::new(hi, 0.0),
    ]
}

/// `count` seeds at uniformly random positions inside the grid, drawn
/// from a ChaCha8 generator so the same `rng_seed` always yields the
/// same set.
pub fn random_seeds(count: usize, size: u32, rng_seed: u64) -> Vec<Seed> {
    let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
    (0..count)
        .map(|_| {
            Seed::new(
                rng.gen_range(0.0..size as f64),
                rng.gen_range(0.0..size as f64),
            )
        })
        .collect()
}
