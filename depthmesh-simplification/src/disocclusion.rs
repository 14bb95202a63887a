//! Removal of rubber-sheet triangles across depth discontinuities
//!
//! A triangle bridging a foreground silhouette and the background behind it
//! is stretched along the view ray: it is seen nearly edge-on and it is long
//! compared to its distance from the camera. Both conditions have to hold for
//! the triangle to be dropped, so small edge-on triangles in fine detail
//! survive.

use depthmesh_core::{Point3f, Vector3f};
use serde::{Deserialize, Serialize};

/// How triangles spanning depth discontinuities are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisocclusionHandling {
    /// Keep every triangle
    NoHandling,
    /// Drop triangles that are both edge-on and large
    #[default]
    RemoveEdgeTriangles,
}

/// Per-triangle disocclusion test for a camera at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisocclusionFilter {
    pub handling: DisocclusionHandling,
    /// Orthogonality above which a triangle counts as edge-on, in [0, 1]
    pub orthogonality_parameter: f32,
    /// Relative size above which an edge-on triangle is removed, in [0, 1]
    pub triangle_size_parameter: f32,
}

impl DisocclusionFilter {
    pub fn new(
        handling: DisocclusionHandling,
        orthogonality_parameter: f32,
        triangle_size_parameter: f32,
    ) -> Self {
        Self {
            handling,
            orthogonality_parameter,
            triangle_size_parameter,
        }
    }

    /// A filter that never removes anything
    pub fn disabled() -> Self {
        Self::new(DisocclusionHandling::NoHandling, 1.0, 1.0)
    }

    /// `1 - |n . r|` for the unit normal `n` and the unit view ray `r` through
    /// the centroid: 0 when facing the camera, 1 when seen edge-on.
    ///
    /// `None` for degenerate triangles or a centroid at the camera centre.
    pub fn orthogonality(triangle: &[Point3f; 3]) -> Option<f32> {
        let normal = face_normal(triangle)?;
        let ray = centroid(triangle).coords;
        let len = ray.norm();
        if len <= f32::EPSILON {
            return None;
        }
        Some(1.0 - (normal.dot(&ray) / len).abs().min(1.0))
    }

    /// Longest edge divided by the centroid's distance to the camera.
    ///
    /// This is the angle the triangle would subtend if it faced the camera,
    /// so it does not shrink when the triangle turns edge-on.
    pub fn relative_size(triangle: &[Point3f; 3]) -> Option<f32> {
        let distance = centroid(triangle).coords.norm();
        if distance <= f32::EPSILON {
            return None;
        }
        let [a, b, c] = triangle;
        let longest = (b - a).norm().max((c - b).norm()).max((a - c).norm());
        Some(longest / distance)
    }

    /// Whether the triangle should be discarded
    pub fn should_remove(&self, triangle: &[Point3f; 3]) -> bool {
        if self.handling == DisocclusionHandling::NoHandling {
            return false;
        }
        let (Some(orthogonality), Some(size)) =
            (Self::orthogonality(triangle), Self::relative_size(triangle))
        else {
            return false;
        };
        orthogonality > self.orthogonality_parameter && size > self.triangle_size_parameter
    }
}

fn face_normal(triangle: &[Point3f; 3]) -> Option<Vector3f> {
    let [a, b, c] = triangle;
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len <= f32::EPSILON * f32::EPSILON {
        return None;
    }
    Some(n / len)
}

fn centroid(triangle: &[Point3f; 3]) -> Point3f {
    let [a, b, c] = triangle;
    Point3f::from((a.coords + b.coords + c.coords) / 3.0)
}
