//! Backend trait and shared argument validation.

use crate::{LabelGrid, Result, Seed, VoronoiError};

/// Trait for grid labeling backends
pub trait ComputeBackend {
    /// Label every cell of a `size` x `size` grid with the index of its
    /// nearest seed
    fn assign(&mut self, size: u32, seeds: &[Seed]) -> Result<LabelGrid>;
}

/// Reject the two invalid-argument cases before any work is scheduled.
/// Every backend calls this first.
pub(crate) fn validate(size: u32, seeds: &[Seed]) -> Result<()> {
    if size == 0 {
        return Err(VoronoiError::ZeroSize);
    }
    if seeds.is_empty() {
        return Err(VoronoiError::NoSeeds);
    }
    Ok(())
}

/// Check every seed for NaN or infinite coordinates.
///
/// The kernel itself never checks: a non-finite coordinate yields NaN
/// distances, and NaN compares false under `<`, so the scan stays
/// deterministic — which labels come out depends only on where the bad
/// seed sits in the sequence. That is rarely what the caller meant, so
/// callers that want a hard rejection run this first.
pub fn check_finite(seeds: &[Seed]) -> Result<()> {
    for (index, seed) in seeds.iter().enumerate() {
        if !seed.is_finite() {
            return Err(VoronoiError::NonFiniteSeed {
                index,
                x: seed.x,
                y: seed.y,
            });
        }
    }
    Ok(())
}
