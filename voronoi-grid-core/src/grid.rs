//! Label grid output type and rendering.

use crate::Rgb;

/// The output of a labeling run: a dense `size` x `size` array holding,
/// for each grid cell, the index of its nearest seed.
///
/// Cell (i, j) is stored at `i * size + j`. The grid is a pure value:
/// created fresh per invocation, fully owned by the caller, with no
/// mutation API after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGrid {
    size: u32,
    labels: Vec<u32>,
}

impl LabelGrid {
    pub(crate) fn from_raw(size: u32, labels: Vec<u32>) -> Self {
        debug_assert_eq!(labels.len(), size as usize * size as usize);
        Self { size, labels }
    }

    /// Side length of the grid
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Index of the nearest seed to cell (i, j).
    ///
    /// Panics if either coordinate is out of range.
    #[inline]
    pub fn get(&self, i: u32, j: u32) -> u32 {
        assert!(i < self.size && j < self.size, "cell out of range");
        self.labels[i as usize * self.size as usize + j as usize]
    }

    /// All labels in row-major order
    pub fn as_slice(&self) -> &[u32] {
        &self.labels
    }

    /// Iterate over rows (constant i, varying j)
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.labels.chunks_exact(self.size as usize)
    }

    /// Consume the grid, yielding the raw row-major label vector
    pub fn into_raw(self) -> Vec<u32> {
        self.labels
    }

    /// Render the labeling to an RGB image, one pixel per cell, with a
    /// deterministic per-index color from [`index_palette`].
    pub fn to_image(&self, num_seeds: usize) -> image::RgbImage {
        let palette = index_palette(num_seeds);
        let mut img = image::RgbImage::new(self.size, self.size);
        for i in 0..self.size {
            for j in 0..self.size {
                let color = palette[self.get(i, j) as usize];
                img.put_pixel(i, j, image::Rgb(color));
            }
        }
        img
    }
}

/// Deterministic palette assigning each seed index a distinct hue.
///
/// Hues step by the golden angle so neighboring indices stay visually
/// far apart even for large seed counts.
pub fn index_palette(num_seeds: usize) -> Vec<Rgb> {
    const GOLDEN_ANGLE: f64 = 137.50776405003785;
    (0..num_seeds)
        .map(|k| hue_to_rgb((k as f64 * GOLDEN_ANGLE) % 360.0))
        .collect()
}

/// Convert a hue in [0, 360) to RGB at full saturation and value
fn hue_to_rgb(hue: f64) -> Rgb {
    let h = hue / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}
