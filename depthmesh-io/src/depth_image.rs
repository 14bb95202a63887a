//! Depth images stored as PNG files
//!
//! Normalized depth samples are written as packed 24-bit RGB (see
//! [`depthmesh_core::encoding`]). 16-bit and 8-bit grayscale images are
//! accepted on read with the gray level as the normalized sample.

use crate::{DepthReader, DepthWriter, IoError};
use depthmesh_core::{decode_distance_rgb, encode_distance_rgb, DepthField, Result};
use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use std::path::Path;
use tracing::debug;

/// Sample layout of a depth image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthImageFormat {
    /// Three-channel packed distance
    PackedRgb,
    /// One 16-bit channel
    Gray16,
    /// One 8-bit channel
    Gray8,
}

pub struct PngDepthCodec;

impl PngDepthCodec {
    /// Decode an in-memory image
    pub fn decode(image: DynamicImage) -> Result<(DepthField, DepthImageFormat)> {
        let (width, height) = (image.width(), image.height());
        let (samples, format): (Vec<f32>, _) = match image {
            DynamicImage::ImageLuma16(buf) => (
                buf.pixels().map(|p| p.0[0] as f32 / u16::MAX as f32).collect(),
                DepthImageFormat::Gray16,
            ),
            DynamicImage::ImageLuma8(buf) => (
                buf.pixels().map(|p| p.0[0] as f32 / u8::MAX as f32).collect(),
                DepthImageFormat::Gray8,
            ),
            other => (
                other
                    .to_rgb8()
                    .pixels()
                    .map(|p| decode_distance_rgb(p.0) as f32)
                    .collect(),
                DepthImageFormat::PackedRgb,
            ),
        };
        Ok((DepthField::from_samples(width, height, samples)?, format))
    }

    /// Encode a depth field in the given layout
    pub fn encode(depth: &DepthField, format: DepthImageFormat) -> DynamicImage {
        let (width, height) = depth.resolution();
        match format {
            DepthImageFormat::PackedRgb => DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
                Rgb(encode_distance_rgb(depth.sample(x, y) as f64))
            })),
            DepthImageFormat::Gray16 => DynamicImage::ImageLuma16(ImageBuffer::from_fn(width, height, |x, y| {
                Luma([(depth.sample(x, y) * u16::MAX as f32).round() as u16])
            })),
            DepthImageFormat::Gray8 => DynamicImage::ImageLuma8(ImageBuffer::from_fn(width, height, |x, y| {
                Luma([(depth.sample(x, y) * u8::MAX as f32).round() as u8])
            })),
        }
    }

    /// Write a depth field in the given layout
    pub fn write_with_format<P: AsRef<Path>>(depth: &DepthField, path: P, format: DepthImageFormat) -> Result<()> {
        let path = path.as_ref();
        Self::encode(depth, format)
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(IoError::from)?;
        debug!(path = %path.display(), ?format, "Wrote depth image");
        Ok(())
    }
}

impl DepthReader for PngDepthCodec {
    fn read_depth<P: AsRef<Path>>(path: P) -> Result<DepthField> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        let image = image::open(path).map_err(IoError::from)?;
        let (depth, format) = Self::decode(image)?;
        debug!(
            path = %path.display(),
            width = depth.width(),
            height = depth.height(),
            ?format,
            "Read depth image"
        );
        Ok(depth)
    }
}

impl DepthWriter for PngDepthCodec {
    fn write_depth<P: AsRef<Path>>(depth: &DepthField, path: P) -> Result<()> {
        Self::write_with_format(depth, path, DepthImageFormat::PackedRgb)
    }
}
