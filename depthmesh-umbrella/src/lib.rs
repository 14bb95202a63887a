//! # depthmesh
//!
//! Turns the depth images of an image-based rendering scene into compact
//! per-view triangle meshes.
//!
//! This is the umbrella crate re-exporting the individual depthmesh crates.
//! Use the sub-crates directly for finer control over dependencies.
//!
//! ## Quick Start
//!
//! ```rust
//! use depthmesh::prelude::*;
//!
//! let camera = CameraModel::perspective((64, 48), (60.0, 45.0), (0.3, 10.0));
//! let depth = DepthField::uniform(64, 48, 0.4).unwrap();
//!
//! let result = MeshGenerator::new(SimplificationParams::default())
//!     .generate(&camera, &depth)
//!     .unwrap();
//! assert!(result.mesh.face_count() < 4 * 64 * 48);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables io and simplification
//! - `simplification`: Quadtree simplification and disocclusion edge removal
//! - `io`: Depth images, OBJ output and view manifests
//! - `all`: Enables all features

// Re-export core functionality
pub use depthmesh_core::*;

#[cfg(feature = "io")]
pub use depthmesh_io as io;

#[cfg(feature = "simplification")]
pub use depthmesh_simplification as simplification;

/// Convenient imports for common use cases
pub mod prelude {
    pub use depthmesh_core::*;

    #[cfg(feature = "io")]
    pub use depthmesh_io::{read_depth_image, write_depth_image, write_mesh, ViewEntry, ViewSet};

    #[cfg(feature = "simplification")]
    pub use depthmesh_simplification::{
        BatchRunner, CancellationToken, DepthMesher, DisocclusionHandling, GeometryMethod, MeshGenerator,
        SimplificationParams,
    };
}
