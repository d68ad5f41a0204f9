//! Discrete grid Voronoi labeling library.
//!
//! For every cell of a square integer grid, determines which seed point is
//! closest under Euclidean distance and records that seed's index,
//! producing a dense [`LabelGrid`]. The same kernel runs either
//! sequentially or parallelized over grid rows with Rayon; both modes
//! produce bit-identical output.

mod compute;
mod cpu;
mod grid;
mod seed;

pub use compute::{check_finite, ComputeBackend};
pub use cpu::CpuBackend;
pub use grid::{index_palette, LabelGrid};
pub use seed::{corner_seeds, random_seeds, Seed};

/// RGB color tuple
pub type Rgb = [u8; 3];

/// Error type for grid labeling operations
#[derive(Debug, thiserror::Error)]
pub enum VoronoiError {
    #[error("grid size must be a positive integer")]
    ZeroSize,

    #[error("no seeds provided")]
    NoSeeds,

    #[error("seed {index} has a non-finite coordinate ({x}, {y})")]
    NonFiniteSeed { index: usize, x: f64, y: f64 },

    #[error("computation cancelled")]
    Cancelled,

    #[error("backend not available: {0}")]
    BackendUnavailable(String),
}

pub type Result<T> = std::result::Result<T, VoronoiError>;
