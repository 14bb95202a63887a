//! Distance-to-color packing used to store depth fields in 8-bit RGB images.
//!
//! A normalized distance is split across three channels by successive
//! fractional scaling with weights 1, 255 and 65025; decoding is the dot
//! product with the inverse weights. The combined precision is one part in
//! 255^3.

/// Quantization step of the three-channel packing (1 / 255^3)
pub const RGB_DISTANCE_STEP: f64 = 1.0 / 16_581_375.0;

const ENCODE_WEIGHTS: [f64; 3] = [1.0, 255.0, 65_025.0];
const DECODE_WEIGHTS: [f64; 3] = [1.0, 1.0 / 255.0, 1.0 / 65_025.0];

/// Pack a normalized distance into three float channels in [0, 1).
///
/// Mirrors the shader-side packing: `frac(v * weights)` with the carry of
/// each finer channel subtracted from the coarser one. Values at or beyond
/// 1 saturate every channel.
pub fn encode_distance_rgb_f32(value: f32) -> [f32; 3] {
    let value = value as f64;
    if value >= 1.0 {
        return [1.0; 3];
    }
    let value = value.max(0.0);

    let enc = ENCODE_WEIGHTS.map(|w| (value * w).fract());
    [
        (enc[0] - enc[1] / 255.0) as f32,
        (enc[1] - enc[2] / 255.0) as f32,
        enc[2] as f32,
    ]
}

/// Inverse of [`encode_distance_rgb_f32`], clamped to [0, 1]
pub fn decode_distance_rgb_f32(rgb: [f32; 3]) -> f32 {
    let value: f64 = rgb
        .iter()
        .zip(DECODE_WEIGHTS)
        .map(|(&c, w)| c as f64 * w)
        .sum();
    value.clamp(0.0, 1.0) as f32
}

/// Pack a normalized distance into 8-bit RGB
pub fn encode_distance_rgb(value: f64) -> [u8; 3] {
    if value >= 1.0 {
        return [255; 3];
    }
    let value = value.max(0.0);

    let scaled = value * 255.0;
    let r = scaled.floor();
    let carry = (scaled - r) * 255.0;
    let g = carry.floor();
    let b = ((carry - g) * 255.0).round();

    [r as u8, g as u8, b.min(255.0) as u8]
}

/// Unpack an 8-bit RGB triple into a normalized distance in [0, 1]
pub fn decode_distance_rgb(rgb: [u8; 3]) -> f64 {
    let value: f64 = rgb
        .iter()
        .zip(DECODE_WEIGHTS)
        .map(|(&c, w)| c as f64 / 255.0 * w)
        .sum();
    value.clamp(0.0, 1.0)
}
