//! User-facing parameters of the quadtree simplification

use crate::disocclusion::{DisocclusionFilter, DisocclusionHandling};
use depthmesh_core::{Error, Result, MAX_DEPTH_FIELD_SIDE};
use serde::{Deserialize, Serialize};

/// Parameters for one mesh generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplificationParams {
    /// Accumulated fitting error (meters) below which a quadtree block stops splitting
    pub triangle_error_threshold: f32,
    pub disocclusion_handling: DisocclusionHandling,
    /// Edge-on threshold of the disocclusion filter, in [0, 1]
    pub orthogonality_parameter: f32,
    /// Size threshold of the disocclusion filter, in [0, 1]
    pub triangle_size_parameter: f32,
    /// Skip blocks lying on the far plane
    pub remove_background: bool,
    /// Unproject to true 3D positions instead of the flattened layout
    pub project_3d: bool,
    /// Depth fields with a longer side are downscaled before processing
    pub max_resolution: u32,
}

impl Default for SimplificationParams {
    fn default() -> Self {
        Self {
            triangle_error_threshold: 0.01,
            disocclusion_handling: DisocclusionHandling::RemoveEdgeTriangles,
            orthogonality_parameter: 0.9,
            triangle_size_parameter: 0.05,
            remove_background: true,
            project_3d: true,
            max_resolution: MAX_DEPTH_FIELD_SIDE,
        }
    }
}

impl SimplificationParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters that keep every pixel: threshold 0 and no triangle removal
    pub fn full_resolution() -> Self {
        Self {
            triangle_error_threshold: 0.0,
            disocclusion_handling: DisocclusionHandling::NoHandling,
            ..Self::default()
        }
    }

    pub fn with_error_threshold(mut self, threshold: f32) -> Self {
        self.triangle_error_threshold = threshold;
        self
    }

    pub fn with_disocclusion_handling(mut self, handling: DisocclusionHandling) -> Self {
        self.disocclusion_handling = handling;
        self
    }

    pub fn with_orthogonality(mut self, orthogonality: f32) -> Self {
        self.orthogonality_parameter = orthogonality;
        self
    }

    pub fn with_triangle_size(mut self, size: f32) -> Self {
        self.triangle_size_parameter = size;
        self
    }

    pub fn with_remove_background(mut self, remove_background: bool) -> Self {
        self.remove_background = remove_background;
        self
    }

    pub fn with_project_3d(mut self, project_3d: bool) -> Self {
        self.project_3d = project_3d;
        self
    }

    pub fn with_max_resolution(mut self, max_resolution: u32) -> Self {
        self.max_resolution = max_resolution;
        self
    }

    /// Disocclusion filter configured from these parameters
    pub fn disocclusion_filter(&self) -> DisocclusionFilter {
        DisocclusionFilter::new(
            self.disocclusion_handling,
            self.orthogonality_parameter,
            self.triangle_size_parameter,
        )
    }

    /// Reject out-of-range values before any buffer is allocated
    pub fn validate(&self) -> Result<()> {
        check_unit_range("triangle_error_threshold", self.triangle_error_threshold)?;
        check_unit_range("orthogonality_parameter", self.orthogonality_parameter)?;
        check_unit_range("triangle_size_parameter", self.triangle_size_parameter)?;
        if self.max_resolution == 0 {
            return Err(Error::invalid_parameter("max_resolution", "must be at least 1"));
        }
        Ok(())
    }
}

fn check_unit_range(name: &'static str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::invalid_parameter(name, format!("must lie in [0, 1], got {}", value)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimplificationParams::default().validate().is_ok());
        assert!(SimplificationParams::full_resolution().validate().is_ok());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(SimplificationParams::new().with_error_threshold(-0.1).validate().is_err());
        assert!(SimplificationParams::new().with_error_threshold(f32::NAN).validate().is_err());
        assert!(SimplificationParams::new().with_orthogonality(1.5).validate().is_err());
        assert!(SimplificationParams::new().with_triangle_size(2.0).validate().is_err());
        assert!(SimplificationParams::new().with_max_resolution(0).validate().is_err());
    }

    #[test]
    fn test_builder() {
        let params = SimplificationParams::new()
            .with_error_threshold(0.2)
            .with_remove_background(false)
            .with_project_3d(false);
        assert_eq!(params.triangle_error_threshold, 0.2);
        assert!(!params.remove_background);
        assert!(!params.project_3d);
        assert_eq!(params.disocclusion_handling, DisocclusionHandling::RemoveEdgeTriangles);
    }
}
