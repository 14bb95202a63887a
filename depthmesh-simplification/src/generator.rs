//! One-call mesh generation for a single source view

use crate::assembler::assemble;
use crate::extractor::MeshExtractor;
use crate::lattice::VertexLattice;
use crate::parallel::{LevelExecutor, RayonExecutor};
use crate::params::SimplificationParams;
use crate::pyramid::QuadtreePyramid;
use crate::stats::CompressionStats;
use depthmesh_core::{Aabb, CameraModel, DepthField, Result, TriangleMesh};
use std::borrow::Cow;
use tracing::{debug, info, warn};

/// Output of one generation call
#[derive(Debug, Clone)]
pub struct GeneratedMesh {
    pub mesh: TriangleMesh,
    /// `None` for an empty mesh
    pub bounds: Option<Aabb>,
    pub stats: CompressionStats,
    /// Resolution actually processed, after the memory clamp
    pub processed_resolution: (u32, u32),
}

/// Quadtree simplification of depth fields.
///
/// The generator only holds configuration; every working buffer (lattice,
/// pyramid, sparse vertex slots) lives inside a single [`generate`] call, so
/// one generator can serve several threads at once.
///
/// [`generate`]: MeshGenerator::generate
#[derive(Debug, Clone)]
pub struct MeshGenerator<E: LevelExecutor = RayonExecutor> {
    params: SimplificationParams,
    executor: E,
}

impl MeshGenerator<RayonExecutor> {
    /// Generator running on rayon's global pool
    pub fn new(params: SimplificationParams) -> Self {
        Self::with_executor(params, RayonExecutor::new())
    }
}

impl Default for MeshGenerator<RayonExecutor> {
    fn default() -> Self {
        Self::new(SimplificationParams::default())
    }
}

impl<E: LevelExecutor> MeshGenerator<E> {
    pub fn with_executor(params: SimplificationParams, executor: E) -> Self {
        Self { params, executor }
    }

    pub fn params(&self) -> &SimplificationParams {
        &self.params
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Simplify one depth field into a mesh.
    ///
    /// Parameters and camera are validated first; depth fields larger than
    /// `max_resolution` are downscaled before any buffer is built.
    #[tracing::instrument(skip_all, fields(width = depth.width(), height = depth.height()))]
    pub fn generate(&self, camera: &CameraModel, depth: &DepthField) -> Result<GeneratedMesh> {
        self.params.validate()?;
        camera.validate()?;

        let depth = if depth.width().max(depth.height()) > self.params.max_resolution {
            Cow::Owned(depth.clone().clamp_resolution(self.params.max_resolution))
        } else {
            Cow::Borrowed(depth)
        };
        let (width, height) = depth.resolution();

        let lattice = VertexLattice::build(
            camera,
            &depth,
            self.params.remove_background,
            self.params.project_3d,
            &self.executor,
        );
        let pyramid = QuadtreePyramid::build(&lattice, &self.executor);
        debug!(
            depth = pyramid.depth(),
            padded_resolution = pyramid.padded_resolution(),
            root_error = pyramid.root().accumulated_error,
            "Built quadtree pyramid"
        );

        let geometry = MeshExtractor::new(
            &pyramid,
            &lattice,
            self.params.disocclusion_filter(),
            self.params.triangle_error_threshold,
        )
        .extract(&self.executor);

        let assembled = assemble(&geometry, &lattice);
        let stats = CompressionStats {
            original_triangle_count: CompressionStats::original_count_for(width, height),
            compressed_triangle_count: assembled.mesh.face_count(),
            removed_triangle_count: geometry.removed_triangle_count,
            leaf_count: geometry.leaf_count,
            accumulated_leaf_error: geometry.leaf_error_sum,
        };

        if assembled.mesh.is_empty() {
            warn!("Depth field produced no geometry");
        }
        info!(
            vertices = assembled.mesh.vertex_count(),
            triangles = stats.compressed_triangle_count,
            removed = stats.removed_triangle_count,
            "Generated depth mesh"
        );

        Ok(GeneratedMesh {
            mesh: assembled.mesh,
            bounds: assembled.bounds,
            stats,
            processed_resolution: (width, height),
        })
    }
}
