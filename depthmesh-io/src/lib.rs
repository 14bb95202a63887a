//! I/O for the depth-map meshing pipeline
//!
//! Reads RGB-packed depth images and JSON view manifests, and writes the
//! generated per-view meshes as Wavefront OBJ.

pub mod depth_image;
pub mod error;
pub mod obj;
pub mod view_set;

#[cfg(test)]
mod tests;

pub use depth_image::{DepthImageFormat, PngDepthCodec};
pub use error::*;
pub use obj::ObjWriter;
pub use view_set::{ViewEntry, ViewSet};

use depthmesh_core::{DepthField, Result, TriangleMesh};
use std::path::Path;

/// Trait for reading depth fields from image files
pub trait DepthReader {
    fn read_depth<P: AsRef<Path>>(path: P) -> Result<DepthField>;
}

/// Trait for writing depth fields to image files
pub trait DepthWriter {
    fn write_depth<P: AsRef<Path>>(depth: &DepthField, path: P) -> Result<()>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Read a depth image, decoding packed RGB or 16-bit grayscale samples
pub fn read_depth_image<P: AsRef<Path>>(path: P) -> Result<DepthField> {
    PngDepthCodec::read_depth(path)
}

/// Write a depth field as an RGB-packed PNG
pub fn write_depth_image<P: AsRef<Path>>(depth: &DepthField, path: P) -> Result<()> {
    PngDepthCodec::write_depth(depth, path)
}

/// Write a mesh as Wavefront OBJ with positions, UVs and normals
pub fn write_obj<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    ObjWriter::write_mesh(mesh, path)
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("obj") => write_obj(mesh, path),
        _ => Err(IoError::InvalidFormat {
            format: format!("Unsupported mesh format: {:?}", path.extension()),
        }
        .into()),
    }
}
