//! Interchangeable per-view geometry processing methods

use crate::disocclusion::DisocclusionHandling;
use crate::generator::{GeneratedMesh, MeshGenerator};
use crate::parallel::LevelExecutor;
use crate::params::SimplificationParams;
use depthmesh_core::{CameraModel, DepthField, Result};
use serde::{Deserialize, Serialize};

/// Turns one depth field into a mesh
pub trait DepthMesher: Send + Sync {
    /// Human-readable method name
    fn name(&self) -> &'static str;

    /// Whether this method can process the given view
    fn is_compatible(&self, camera: &CameraModel, depth: &DepthField) -> bool;

    /// Effective simplification parameters
    fn parameters(&self) -> SimplificationParams;

    fn mesh(&self, camera: &CameraModel, depth: &DepthField) -> Result<GeneratedMesh>;
}

impl<E: LevelExecutor + Send> DepthMesher for MeshGenerator<E> {
    fn name(&self) -> &'static str {
        "Quadtree simplification and triangle removal"
    }

    fn is_compatible(&self, camera: &CameraModel, depth: &DepthField) -> bool {
        camera.validate().is_ok() && self.params().validate().is_ok() && depth.pixel_count() > 0
    }

    fn parameters(&self) -> SimplificationParams {
        *self.params()
    }

    fn mesh(&self, camera: &CameraModel, depth: &DepthField) -> Result<GeneratedMesh> {
        self.generate(camera, depth)
    }
}

/// Available per-view geometry methods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum GeometryMethod {
    /// Error-bounded quadtree simplification with optional edge removal
    QuadtreeSimplification(SimplificationParams),
    /// One fan per pixel, no simplification and no triangle removal
    FullResolution { remove_background: bool, project_3d: bool },
}

impl Default for GeometryMethod {
    fn default() -> Self {
        GeometryMethod::QuadtreeSimplification(SimplificationParams::default())
    }
}

impl GeometryMethod {
    fn generator(&self) -> MeshGenerator {
        MeshGenerator::new(self.parameters())
    }
}

impl DepthMesher for GeometryMethod {
    fn name(&self) -> &'static str {
        match self {
            GeometryMethod::QuadtreeSimplification(_) => "Quadtree simplification and triangle removal",
            GeometryMethod::FullResolution { .. } => "Full-resolution per-pixel mesh",
        }
    }

    fn is_compatible(&self, camera: &CameraModel, depth: &DepthField) -> bool {
        self.generator().is_compatible(camera, depth)
    }

    fn parameters(&self) -> SimplificationParams {
        match *self {
            GeometryMethod::QuadtreeSimplification(params) => params,
            GeometryMethod::FullResolution {
                remove_background,
                project_3d,
            } => SimplificationParams::full_resolution()
                .with_disocclusion_handling(DisocclusionHandling::NoHandling)
                .with_remove_background(remove_background)
                .with_project_3d(project_3d),
        }
    }

    fn mesh(&self, camera: &CameraModel, depth: &DepthField) -> Result<GeneratedMesh> {
        self.generator().generate(camera, depth)
    }
}
