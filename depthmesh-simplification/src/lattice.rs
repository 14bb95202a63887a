//! Vertex lattice shared by every quadtree block
//!
//! Vertices sit either on pixel corners or on pixel centres. Each lattice
//! point gets exactly one position, computed once from the depth field, so
//! two blocks touching the same point always resolve to the same vertex.

use crate::parallel::LevelExecutor;
use depthmesh_core::{CameraModel, DepthField, Point3f, Uv};
use itertools::iproduct;

/// Flat index of a lattice point, used as the sparse vertex slot
pub type LatticeKey = usize;

/// A vertex location in pixel units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatticePoint {
    /// Corner `(i, j)` with `i <= width`, `j <= height`
    Corner { i: u32, j: u32 },
    /// Centre of pixel `(x, y)`
    Centre { x: u32, y: u32 },
}

/// Positions of all corner and centre vertices of one depth field
#[derive(Debug, Clone)]
pub struct VertexLattice {
    width: u32,
    height: u32,
    corners: Vec<Option<Point3f>>,
    centres: Vec<Option<Point3f>>,
}

impl VertexLattice {
    /// Unproject every lattice point.
    ///
    /// A pixel is valid unless `remove_background` is set and it lies on the
    /// far plane. Centres use their own pixel's distance; corners average the
    /// valid pixels around them (only the ones inside the image on the
    /// border). Points without a valid pixel stay `None`.
    pub fn build<E: LevelExecutor>(
        camera: &CameraModel,
        depth: &DepthField,
        remove_background: bool,
        project_3d: bool,
        executor: &E,
    ) -> Self {
        let (width, height) = depth.resolution();
        let (w, h) = (width as f32, height as f32);

        let distance = |x: u32, y: u32| -> Option<f32> {
            if remove_background && depth.is_background(x, y) {
                None
            } else {
                Some(camera.distance_from_sample(depth.sample(x, y)))
            }
        };

        let centres = executor.map_level(depth.pixel_count(), |k| {
            let (x, y) = (k as u32 % width, k as u32 / width);
            let d = distance(x, y)?;
            Some(camera.unproject((x as f32 + 0.5) / w, (y as f32 + 0.5) / h, d, project_3d))
        });

        let corner_columns = width + 1;
        let corner_count = corner_columns as usize * (height as usize + 1);
        let corners = executor.map_level(corner_count, |k| {
            let (i, j) = (k as u32 % corner_columns, k as u32 / corner_columns);
            let (sum, count) = iproduct!(
                j.saturating_sub(1)..(j + 1).min(height),
                i.saturating_sub(1)..(i + 1).min(width)
            )
            .filter_map(|(y, x)| distance(x, y))
            .fold((0.0f32, 0u32), |(sum, count), d| (sum + d, count + 1));

            if count == 0 {
                return None;
            }
            Some(camera.unproject(i as f32 / w, j as f32 / h, sum / count as f32, project_3d))
        });

        Self {
            width,
            height,
            corners,
            centres,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of sparse vertex slots
    pub fn key_count(&self) -> usize {
        self.corners.len() + self.centres.len()
    }

    /// Corner keys come first and run from 0 to `corner_count()`
    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }

    pub fn key(&self, point: LatticePoint) -> LatticeKey {
        match point {
            LatticePoint::Corner { i, j } => j as usize * (self.width as usize + 1) + i as usize,
            LatticePoint::Centre { x, y } => {
                self.corners.len() + y as usize * self.width as usize + x as usize
            }
        }
    }

    pub fn point(&self, key: LatticeKey) -> LatticePoint {
        if key < self.corners.len() {
            let columns = self.width as usize + 1;
            LatticePoint::Corner {
                i: (key % columns) as u32,
                j: (key / columns) as u32,
            }
        } else {
            let k = key - self.corners.len();
            LatticePoint::Centre {
                x: (k % self.width as usize) as u32,
                y: (k / self.width as usize) as u32,
            }
        }
    }

    pub fn position(&self, key: LatticeKey) -> Option<Point3f> {
        if key < self.corners.len() {
            self.corners[key]
        } else {
            self.centres.get(key - self.corners.len()).copied().flatten()
        }
    }

    #[inline]
    pub fn corner(&self, i: u32, j: u32) -> Option<Point3f> {
        self.corners[self.key(LatticePoint::Corner { i, j })]
    }

    #[inline]
    pub fn centre(&self, x: u32, y: u32) -> Option<Point3f> {
        self.centres[y as usize * self.width as usize + x as usize]
    }

    /// Whether pixel `(x, y)` lies inside the image and carries geometry
    #[inline]
    pub fn is_valid_pixel(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.centre(x, y).is_some()
    }

    /// Texture coordinate of a lattice point, `v` pointing up
    pub fn uv(&self, key: LatticeKey) -> Uv {
        let (px, py) = match self.point(key) {
            LatticePoint::Corner { i, j } => (i as f32, j as f32),
            LatticePoint::Centre { x, y } => (x as f32 + 0.5, y as f32 + 0.5),
        };
        [px / self.width as f32, 1.0 - py / self.height as f32]
    }
}
