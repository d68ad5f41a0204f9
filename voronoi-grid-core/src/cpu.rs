//! CPU grid labeling, sequential or Rayon-parallelized over rows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::compute::{validate, ComputeBackend};
use crate::{LabelGrid, Result, Seed, VoronoiError};

/// CPU backend running the brute-force assignment kernel either as a
/// single control flow or with rows partitioned across a Rayon pool.
/// Both modes produce bit-identical output.
pub struct CpuBackend {
    /// Number of threads for the parallel mode (0 = Rayon default)
    pub num_threads: usize,
    /// Partition rows across workers instead of a single control flow
    pub parallel: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self { num_threads: 0, parallel: true, cancel: None }
    }

    pub fn sequential() -> Self {
        Self { num_threads: 0, parallel: false, cancel: None }
    }

    pub fn with_threads(num_threads: usize) -> Self {
        Self { num_threads, parallel: true, cancel: None }
    }

    /// Cooperative cancellation: workers check the flag between rows and
    /// the call returns [`VoronoiError::Cancelled`] once it is raised.
    /// No partial grid is ever returned.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(VoronoiError::Cancelled),
            _ => Ok(()),
        }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the nearest seed to cell (i, j), scanning seeds in index order.
///
/// A later seed replaces the running best only when strictly closer, so
/// the lowest index among equidistant seeds always wins. Squared
/// distances order identically to true Euclidean distances, ties
/// included, so no square root is taken.
#[inline]
fn nearest_seed(i: u32, j: u32, seeds: &[Seed]) -> u32 {
    let mut best = 0u32;
    let mut best_dist = seeds[0].dist_sq(i, j);
    for (k, seed) in seeds.iter().enumerate().skip(1) {
        let dist = seed.dist_sq(i, j);
        if dist < best_dist {
            best_dist = dist;
            best = k as u32;
        }
    }
    best
}

/// Fill one output row: labels for cells (i, 0..size)
fn fill_row(i: u32, row: &mut [u32], seeds: &[Seed]) {
    for (j, label) in row.iter_mut().enumerate() {
        *label = nearest_seed(i, j as u32, seeds);
    }
}

impl CpuBackend {
    fn assign_sequential(&self, size: u32, seeds: &[Seed]) -> Result<LabelGrid> {
        let n = size as usize;
        let mut labels = vec![0u32; n * n];
        for (i, row) in labels.chunks_exact_mut(n).enumerate() {
            self.check_cancelled()?;
            fill_row(i as u32, row, seeds);
        }
        Ok(LabelGrid::from_raw(size, labels))
    }

    /// Rows [0, size) partitioned across the pool. Each worker writes
    /// only its own rows of the output buffer and reads the shared seed
    /// slice; the Rayon join is the only barrier.
    #[cfg(feature = "parallel")]
    fn assign_parallel(&self, size: u32, seeds: &[Seed]) -> Result<LabelGrid> {
        let n = size as usize;
        let mut labels = vec![0u32; n * n];

        let fill_all = |labels: &mut [u32]| -> Result<()> {
            labels
                .par_chunks_exact_mut(n)
                .enumerate()
                .try_for_each(|(i, row)| {
                    self.check_cancelled()?;
                    fill_row(i as u32, row, seeds);
                    Ok(())
                })
        };

        if self.num_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.num_threads)
                .build()
                .map_err(|e| VoronoiError::BackendUnavailable(e.to_string()))?;
            pool.install(|| fill_all(&mut labels))?;
        } else {
            fill_all(&mut labels)?;
        }
        Ok(LabelGrid::from_raw(size, labels))
    }
}

impl ComputeBackend for CpuBackend {
    fn assign(&mut self, size: u32, seeds: &[Seed]) -> Result<LabelGrid> {
        validate(size, seeds)?;
        if self.parallel {
            #[cfg(feature = "parallel")]
            return self.assign_parallel(size, seeds);

            #[cfg(not(feature = "parallel"))]
            return Err(VoronoiError::BackendUnavailable(
                "parallel mode requires the `parallel` feature".into(),
            ));
        }
        self.assign_sequential(size, seeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{corner_seeds, random_seeds};

    fn assign(backend: &mut CpuBackend, size: u32, seeds: &[Seed]) -> LabelGrid {
        backend.assign(size, seeds).unwrap()
    }

    #[test]
    fn test_minimal_grid() {
        let grid = assign(&mut CpuBackend::sequential(), 1, &[Seed::new(0.0, 0.0)]);
        assert_eq!(grid.as_slice(), &[0]);
    }

    #[test]
    fn test_tie_break_lowest_index_wins() {
        // Cell (1, 0) is at distance 1 from both seeds
        let seeds = vec![Seed::new(0.0, 0.0), Seed::new(2.0, 0.0)];
        let grid = assign(&mut CpuBackend::sequential(), 3, &seeds);
        assert_eq!(grid.get(1, 0), 0);
    }

    #[test]
    fn test_duplicate_seeds_tie_to_lowest_index() {
        let seeds = vec![Seed::new(1.0, 1.0), Seed::new(1.0, 1.0)];
        let grid = assign(&mut CpuBackend::new(), 3, &seeds);
        assert!(grid.as_slice().iter().all(|&label| label == 0));
    }

    #[test]
    fn test_every_cell_is_a_seed() {
        // Each cell of a 2x2 grid coincides exactly with one seed
        let seeds = vec![
            Seed::new(0.0, 0.0),
            Seed::new(1.0, 1.0),
            Seed::new(1.0, 0.0),
            Seed::new(0.0, 1.0),
        ];
        let grid = assign(&mut CpuBackend::sequential(), 2, &seeds);
        assert_eq!(grid.as_slice(), &[0, 3, 2, 1]);
    }

    #[test]
    fn test_self_seed_exactness() {
        let seeds = vec![
            Seed::new(3.0, 7.0),
            Seed::new(12.0, 2.0),
            Seed::new(3.0, 7.0), // duplicate of seed 0
            Seed::new(9.0, 14.0),
        ];
        let grid = assign(&mut CpuBackend::new(), 16, &seeds);

        assert_eq!(grid.get(3, 7), 0);
        assert_eq!(grid.get(12, 2), 1);
        // Seed 2 shares its coordinate with seed 0, which wins the tie
        assert_eq!(grid.get(9, 14), 3);
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        let seeds = vec![Seed::new(0.0, 0.0)];
        let mut backend = CpuBackend::new();

        assert!(matches!(
            backend.assign(0, &seeds),
            Err(VoronoiError::ZeroSize)
        ));
        assert!(matches!(backend.assign(8, &[]), Err(VoronoiError::NoSeeds)));
    }

    #[test]
    fn test_corner_seeds_quadrants() {
        let size = 64;
        let grid = assign(&mut CpuBackend::new(), size, &corner_seeds(size));

        // Cells adjacent to each corner belong to that corner's seed
        assert_eq!(grid.get(1, 1), 0);
        assert_eq!(grid.get(1, size - 2), 1);
        assert_eq!(grid.get(size - 2, size - 2), 2);
        assert_eq!(grid.get(size - 2, 1), 3);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_sequential_matches_parallel() {
        for (size, count, rng_seed) in [(1, 1, 0), (17, 3, 1), (64, 25, 42), (100, 200, 7)] {
            let seeds = random_seeds(count, size, rng_seed);
            let seq = assign(&mut CpuBackend::sequential(), size, &seeds);
            let par = assign(&mut CpuBackend::new(), size, &seeds);
            assert_eq!(
                seq, par,
                "mode mismatch for size={} count={} rng_seed={}",
                size, count, rng_seed
            );
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_pinned_thread_count_matches() {
        let seeds = random_seeds(30, 48, 9);
        let default_pool = assign(&mut CpuBackend::new(), 48, &seeds);
        for threads in [1, 2, 4] {
            let pinned = assign(&mut CpuBackend::with_threads(threads), 48, &seeds);
            assert_eq!(default_pool, pinned, "{} threads", threads);
        }
    }

    #[test]
    fn test_cancellation() {
        let flag = Arc::new(AtomicBool::new(true));
        let seeds = random_seeds(4, 32, 0);

        let mut seq = CpuBackend::sequential().with_cancel_flag(flag.clone());
        assert!(matches!(seq.assign(32, &seeds), Err(VoronoiError::Cancelled)));

        let mut par = CpuBackend::new().with_cancel_flag(flag.clone());
        assert!(matches!(par.assign(32, &seeds), Err(VoronoiError::Cancelled)));

        // Lowered flag: computation proceeds normally
        flag.store(false, Ordering::Relaxed);
        let mut live = CpuBackend::sequential().with_cancel_flag(flag);
        assert!(live.assign(32, &seeds).is_ok());
    }

    #[test]
    fn test_nan_seed_is_deterministic() {
        // NaN distances compare false under `<`: a NaN seed in a later
        // slot never wins, and a NaN seed in slot 0 is never replaced.
        let nan_last = vec![Seed::new(0.0, 0.0), Seed::new(f64::NAN, 0.0)];
        let grid = assign(&mut CpuBackend::sequential(), 4, &nan_last);
        assert!(grid.as_slice().iter().all(|&label| label == 0));

        let nan_first = vec![Seed::new(f64::NAN, 0.0), Seed::new(2.0, 2.0)];
        let grid = assign(&mut CpuBackend::sequential(), 4, &nan_first);
        assert!(grid.as_slice().iter().all(|&label| label == 0));
    }
}
