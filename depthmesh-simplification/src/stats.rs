//! Compression statistics reported for each generated mesh

use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of how much a depth field was simplified
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompressionStats {
    /// `4 * width * height`: the fan of every pixel
    pub original_triangle_count: usize,
    pub compressed_triangle_count: usize,
    /// Triangles dropped by the disocclusion filter
    pub removed_triangle_count: usize,
    pub leaf_count: usize,
    /// Sum of the accumulated errors of all leaves, in meters
    pub accumulated_leaf_error: f64,
}

impl CompressionStats {
    /// Triangle count of a full-resolution mesh of a `width` x `height` depth field
    pub fn original_count_for(width: u32, height: u32) -> usize {
        4 * width as usize * height as usize
    }

    /// Original over compressed triangle count, `None` when nothing was emitted
    pub fn compression_ratio(&self) -> Option<f64> {
        (self.compressed_triangle_count > 0)
            .then(|| self.original_triangle_count as f64 / self.compressed_triangle_count as f64)
    }

    /// `100 * (1 - 1 / ratio)`; 100 when nothing was emitted
    pub fn space_savings_percent(&self) -> f64 {
        match self.compression_ratio() {
            Some(ratio) => 100.0 * (1.0 - 1.0 / ratio),
            None => 100.0,
        }
    }

    /// Leaf error per emitted triangle, in meters
    pub fn average_error(&self) -> f64 {
        if self.compressed_triangle_count == 0 {
            return 0.0;
        }
        self.accumulated_leaf_error / self.compressed_triangle_count as f64
    }

    /// Three display lines: triangle counts, compression, average error
    pub fn summary_lines(&self) -> [String; 3] {
        let ratio = match self.compression_ratio() {
            Some(ratio) => format!("{:.2}", ratio),
            None => "n/a".to_string(),
        };
        [
            format!(
                "Triangles: {} -> {} ({} removed as disocclusion edges)",
                self.original_triangle_count, self.compressed_triangle_count, self.removed_triangle_count
            ),
            format!(
                "Compression ratio: {} (space savings: {:.2}%)",
                ratio,
                self.space_savings_percent()
            ),
            format!("Average error: {:.6} m per triangle", self.average_error()),
        ]
    }
}

impl fmt::Display for CompressionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary_lines().join("\n"))
    }
}
