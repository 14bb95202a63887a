//! Core data structures and traits for depthmesh
//!
//! This crate provides the fundamental types shared by the depth-map meshing
//! pipeline: camera models, per-view depth fields, the RGB distance codec and
//! the triangle mesh produced at the end of the pipeline.

pub mod point;
pub mod mesh;
pub mod traits;
pub mod camera;
pub mod depth_field;
pub mod encoding;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use traits::*;
pub use camera::*;
pub use depth_field::*;
pub use encoding::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

// Type aliases for easier imports
pub type Point = Point3f;
pub type Mesh = TriangleMesh;
