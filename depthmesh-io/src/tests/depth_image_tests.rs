//! Round trips of depth fields through PNG files

use super::scratch_dir;
use crate::*;
use approx::assert_relative_eq;
use depthmesh_core::{DepthField, Error, RGB_DISTANCE_STEP};
use std::fs;

fn gradient(width: u32, height: u32) -> DepthField {
    DepthField::from_fn(width, height, |x, y| (x + y * width) as f32 / (width * height) as f32).unwrap()
}

#[test]
fn test_packed_rgb_round_trip() {
    let dir = scratch_dir("packed_rgb");
    let path = dir.join("depth.png");
    let depth = gradient(16, 8);

    write_depth_image(&depth, &path).unwrap();
    let loaded = read_depth_image(&path).unwrap();

    assert_eq!(loaded.resolution(), (16, 8));
    for y in 0..8 {
        for x in 0..16 {
            assert_relative_eq!(loaded.sample(x, y), depth.sample(x, y), epsilon = 2.0 * RGB_DISTANCE_STEP as f32 + 1e-6);
        }
    }

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_background_survives_round_trip() {
    let dir = scratch_dir("background");
    let path = dir.join("depth.png");
    let depth = DepthField::from_fn(4, 4, |x, _| if x == 0 { 1.0 } else { 0.5 }).unwrap();

    write_depth_image(&depth, &path).unwrap();
    let loaded = read_depth_image(&path).unwrap();
    assert!((0..4).all(|y| loaded.is_background(0, y)));
    assert!((0..4).all(|y| !loaded.is_background(1, y)));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_gray16_is_accepted() {
    let dir = scratch_dir("gray16");
    let path = dir.join("depth16.png");
    let depth = gradient(8, 8);

    PngDepthCodec::write_with_format(&depth, &path, DepthImageFormat::Gray16).unwrap();
    let image = image::open(&path).unwrap();
    let (loaded, format) = PngDepthCodec::decode(image).unwrap();

    assert_eq!(format, DepthImageFormat::Gray16);
    assert_relative_eq!(loaded.sample(5, 3), depth.sample(5, 3), epsilon = 1.0 / 65535.0);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_missing_depth_image() {
    let dir = scratch_dir("missing");
    let result = read_depth_image(dir.join("nope.png"));
    assert!(matches!(result, Err(Error::Io(_))));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_not_an_image() {
    let dir = scratch_dir("garbage");
    let path = dir.join("depth.png");
    fs::write(&path, b"definitely not a png").unwrap();
    assert!(read_depth_image(&path).is_err());
    let _ = fs::remove_dir_all(dir);
}
