//! Per-view depth fields

use crate::error::*;
use ndarray::Array2;
use tracing::debug;

/// Largest side length processed without downscaling
pub const MAX_DEPTH_FIELD_SIDE: u32 = 2048;

/// A rectangular grid of normalized distances for one source view.
///
/// Samples lie in [0, 1] and map linearly onto the camera's distance range;
/// a sample of 1 sits on the far plane and is treated as background.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthField {
    /// Indexed `[[y, x]]`, row 0 at the top of the image
    samples: Array2<f32>,
}

impl DepthField {
    /// Build a depth field from row-major samples
    pub fn from_samples(width: u32, height: u32, samples: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidData(format!(
                "depth field resolution must be non-zero, got {}x{}",
                width, height
            )));
        }
        if let Some(bad) = samples.iter().find(|s| !s.is_finite()) {
            return Err(Error::InvalidData(format!("depth sample is not finite: {}", bad)));
        }

        let samples = Array2::from_shape_vec((height as usize, width as usize), samples)
            .map_err(|e| Error::InvalidData(format!("depth sample count mismatch: {}", e)))?
            .mapv(|s| s.clamp(0.0, 1.0));

        Ok(Self { samples })
    }

    /// Build a depth field by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> f32,
    {
        let mut samples = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self::from_samples(width, height, samples)
    }

    /// A depth field with the same sample everywhere
    pub fn uniform(width: u32, height: u32, sample: f32) -> Result<Self> {
        Self::from_fn(width, height, |_, _| sample)
    }

    pub fn width(&self) -> u32 {
        self.samples.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.samples.nrows() as u32
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn pixel_count(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> f32 {
        self.samples[[y as usize, x as usize]]
    }

    /// Whether the pixel lies on (or beyond) the far plane
    #[inline]
    pub fn is_background(&self, x: u32, y: u32) -> bool {
        self.sample(x, y) >= 1.0
    }

    pub fn samples(&self) -> &Array2<f32> {
        &self.samples
    }

    /// Next power of two covering both dimensions
    pub fn equivalent_power_of_two_resolution(&self) -> u32 {
        equivalent_power_of_two(self.width(), self.height())
    }

    /// Downscale so that neither side exceeds `max_side`.
    ///
    /// Nearest-neighbour sampling keeps depth edges sharp; averaging would
    /// invent surfaces floating between foreground and background.
    pub fn clamp_resolution(self, max_side: u32) -> Self {
        let (width, height) = self.resolution();
        let longest = width.max(height);
        if max_side == 0 || longest <= max_side {
            return self;
        }

        let scale = max_side as f64 / longest as f64;
        let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_side);
        let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_side);
        debug!(
            "Downscaling depth field from {}x{} to {}x{}",
            width, height, new_width, new_height
        );

        let samples = Array2::from_shape_fn((new_height as usize, new_width as usize), |(y, x)| {
            let sx = (((x as f64 + 0.5) * width as f64 / new_width as f64) as usize).min(width as usize - 1);
            let sy = (((y as f64 + 0.5) * height as f64 / new_height as f64) as usize).min(height as usize - 1);
            self.samples[[sy, sx]]
        });

        Self { samples }
    }
}

/// Side of the smallest square power-of-two grid holding a `width` x `height` image
pub fn equivalent_power_of_two(width: u32, height: u32) -> u32 {
    width.max(height).next_power_of_two()
}
