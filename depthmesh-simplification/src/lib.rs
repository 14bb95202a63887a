//! Depth-map mesh simplification
//!
//! This crate turns a per-view depth field into a simplified triangle mesh
//! using quadtree simplification and triangle removal:
//! - a vertex lattice unprojecting pixel corners and centres
//! - a bottom-up quadtree pyramid accumulating fitting errors
//! - top-down split decisions bounded by an error threshold
//! - removal of rubber-sheet triangles across depth discontinuities
//! - compaction into an indexed mesh with normals, bounds and statistics
//!
//! Each quadtree level is processed as one data-parallel pass through a
//! [`LevelExecutor`], so the same code runs sequentially or on rayon.

pub mod parallel;
pub mod params;
pub mod lattice;
pub mod pyramid;
pub mod extractor;
pub mod disocclusion;
pub mod assembler;
pub mod stats;
pub mod generator;
pub mod method;
pub mod batch;

pub use parallel::*;
pub use params::*;
pub use lattice::*;
pub use pyramid::*;
pub use extractor::*;
pub use disocclusion::*;
pub use assembler::*;
pub use stats::*;
pub use generator::*;
pub use method::*;
pub use batch::*;
