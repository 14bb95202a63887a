//! Camera models describing how a source view was projected

use crate::{error::*, point::*};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Projection used by a source view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Projection {
    /// Pinhole projection with horizontal and vertical field of view in degrees
    Perspective { field_of_view: (f32, f32) },
    /// Equirectangular 360x180 degree projection
    Omnidirectional,
}

/// Projection parameters for one source view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    pub projection: Projection,
    /// Width and height in pixels
    pub pixel_resolution: (u32, u32),
    /// Near and far valid distance along the view ray
    pub distance_range: (f32, f32),
}

impl CameraModel {
    pub fn perspective(pixel_resolution: (u32, u32), field_of_view: (f32, f32), distance_range: (f32, f32)) -> Self {
        Self {
            projection: Projection::Perspective { field_of_view },
            pixel_resolution,
            distance_range,
        }
    }

    pub fn omnidirectional(pixel_resolution: (u32, u32), distance_range: (f32, f32)) -> Self {
        Self {
            projection: Projection::Omnidirectional,
            pixel_resolution,
            distance_range,
        }
    }

    pub fn is_omnidirectional(&self) -> bool {
        matches!(self.projection, Projection::Omnidirectional)
    }

    /// Horizontal and vertical field of view in degrees.
    ///
    /// Always `(360, 180)` for omnidirectional cameras.
    pub fn field_of_view(&self) -> (f32, f32) {
        match self.projection {
            Projection::Perspective { field_of_view } => field_of_view,
            Projection::Omnidirectional => (360.0, 180.0),
        }
    }

    pub fn near(&self) -> f32 {
        self.distance_range.0
    }

    pub fn far(&self) -> f32 {
        self.distance_range.1
    }

    /// Copy of this camera with a different pixel resolution
    pub fn with_pixel_resolution(mut self, pixel_resolution: (u32, u32)) -> Self {
        self.pixel_resolution = pixel_resolution;
        self
    }

    /// Reject camera setups the meshing pipeline cannot handle
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.pixel_resolution;
        if w == 0 || h == 0 {
            return Err(Error::invalid_parameter(
                "pixel_resolution",
                format!("must be non-zero, got {}x{}", w, h),
            ));
        }

        if let Projection::Perspective { field_of_view: (fx, fy) } = self.projection {
            for fov in [fx, fy] {
                if !fov.is_finite() || fov <= 0.0 || fov >= 180.0 {
                    return Err(Error::invalid_parameter(
                        "field_of_view",
                        format!("perspective field of view must lie in (0, 180) degrees, got {}", fov),
                    ));
                }
            }
        }

        let (near, far) = self.distance_range;
        if !near.is_finite() || !far.is_finite() || near < 0.0 || near >= far {
            return Err(Error::invalid_parameter(
                "distance_range",
                format!("expected 0 <= near < far, got ({}, {})", near, far),
            ));
        }

        Ok(())
    }

    /// Metric distance encoded by a normalized depth sample
    pub fn distance_from_sample(&self, sample: f32) -> f32 {
        let (near, far) = self.distance_range;
        near + sample.clamp(0.0, 1.0) * (far - near)
    }

    /// Ray through normalized image coordinates.
    ///
    /// `u` grows to the right and `v` downwards from the top row, both in
    /// [0, 1]. Perspective rays end on the image plane `z = 1`;
    /// omnidirectional rays have unit length.
    pub fn ray(&self, u: f32, v: f32) -> Vector3f {
        match self.projection {
            Projection::Perspective { field_of_view: (fx, fy) } => {
                let tx = (fx.to_radians() * 0.5).tan();
                let ty = (fy.to_radians() * 0.5).tan();
                Vector3f::new((2.0 * u - 1.0) * tx, (1.0 - 2.0 * v) * ty, 1.0)
            }
            Projection::Omnidirectional => {
                let longitude = (u - 0.5) * 2.0 * PI;
                let latitude = (0.5 - v) * PI;
                let (sin_lat, cos_lat) = latitude.sin_cos();
                let (sin_lon, cos_lon) = longitude.sin_cos();
                Vector3f::new(cos_lat * sin_lon, sin_lat, cos_lat * cos_lon)
            }
        }
    }

    /// Unproject normalized image coordinates and a distance along the ray.
    ///
    /// With `project_3d` unset the point stays on the flattened layout
    /// (image plane or unit sphere) and the distance is ignored.
    pub fn unproject(&self, u: f32, v: f32, distance: f32, project_3d: bool) -> Point3f {
        let ray = self.ray(u, v);
        if !project_3d {
            return Point3f::from(ray);
        }
        Point3f::from(ray.normalize() * distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_omnidirectional_fov_is_fixed() {
        let camera = CameraModel::omnidirectional((512, 256), (0.1, 10.0));
        assert!(camera.is_omnidirectional());
        assert_eq!(camera.field_of_view(), (360.0, 180.0));
    }

    #[test]
    fn test_validate() {
        assert!(CameraModel::perspective((64, 64), (60.0, 60.0), (0.1, 10.0)).validate().is_ok());
        assert!(CameraModel::perspective((0, 64), (60.0, 60.0), (0.1, 10.0)).validate().is_err());
        assert!(CameraModel::perspective((64, 64), (180.0, 60.0), (0.1, 10.0)).validate().is_err());
        assert!(CameraModel::perspective((64, 64), (60.0, 60.0), (5.0, 5.0)).validate().is_err());
        assert!(CameraModel::omnidirectional((64, 32), (-1.0, 5.0)).validate().is_err());
    }

    #[test]
    fn test_perspective_center_ray() {
        let camera = CameraModel::perspective((64, 64), (90.0, 90.0), (0.1, 10.0));
        let p = camera.unproject(0.5, 0.5, 2.0, true);
        assert_relative_eq!(p, Point3f::new(0.0, 0.0, 2.0), epsilon = 1e-6);

        // Top-left corner of a 90 degree frustum sits at (-1, 1, 1) on the image plane.
        let corner = camera.unproject(0.0, 0.0, 3.0, false);
        assert_relative_eq!(corner, Point3f::new(-1.0, 1.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_unprojected_distance_is_along_ray() {
        let camera = CameraModel::perspective((64, 48), (70.0, 50.0), (0.1, 10.0));
        let p = camera.unproject(0.1, 0.8, 4.0, true);
        assert_relative_eq!(p.coords.norm(), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_omnidirectional_axes() {
        let camera = CameraModel::omnidirectional((256, 128), (0.1, 10.0));
        assert_relative_eq!(camera.ray(0.5, 0.5), Vector3f::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        assert_relative_eq!(camera.ray(0.75, 0.5), Vector3f::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(camera.ray(0.5, 0.0), Vector3f::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_distance_from_sample() {
        let camera = CameraModel::perspective((8, 8), (60.0, 60.0), (1.0, 5.0));
        assert_relative_eq!(camera.distance_from_sample(0.0), 1.0);
        assert_relative_eq!(camera.distance_from_sample(0.5), 3.0);
        assert_relative_eq!(camera.distance_from_sample(2.0), 5.0);
    }
}
