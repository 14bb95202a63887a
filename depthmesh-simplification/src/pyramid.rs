//! Bottom-up quadtree pyramid over a depth field
//!
//! Level 0 holds one node per pixel of the padded power-of-two grid; each
//! coarser level halves the side length. A node is *full* when every pixel
//! it covers is valid, *empty* when none is and *mixed* otherwise. Only full
//! nodes carry a position and a fitting error.
//!
//! The coarse approximation of a full node is the bilinear patch through its
//! four corner vertices. Its local fitting error is the largest distance
//! between that patch and the points a split would introduce: the block
//! centre, the four edge midpoints and the four children's positions. The
//! accumulated error adds the children's accumulated errors, so it never
//! decreases towards the root.

use crate::lattice::VertexLattice;
use crate::parallel::LevelExecutor;
use depthmesh_core::{equivalent_power_of_two, Point3f};
use tracing::debug;

/// One node of the quadtree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadtreeNode {
    /// Representative vertex: the pixel centre on level 0, the block centre above
    pub position: Option<Point3f>,
    /// Sum of child errors plus the local fitting error, in distance units
    pub accumulated_error: f32,
    /// Number of valid pixels below this node
    pub coverage: u32,
}

impl QuadtreeNode {
    const EMPTY: Self = Self {
        position: None,
        accumulated_error: 0.0,
        coverage: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.coverage == 0
    }
}

/// All nodes of one level, row-major
#[derive(Debug, Clone)]
pub struct QuadtreeLevel {
    pub level: u32,
    /// Nodes per row (and per column)
    pub side: u32,
    pub nodes: Vec<QuadtreeNode>,
}

impl QuadtreeLevel {
    /// Pixels per node edge
    pub fn block_size(&self) -> u32 {
        1 << self.level
    }

    #[inline]
    pub fn node(&self, x: u32, y: u32) -> &QuadtreeNode {
        &self.nodes[(y * self.side + x) as usize]
    }

    /// Whether the node covers only valid pixels
    #[inline]
    pub fn is_full(&self, node: &QuadtreeNode) -> bool {
        node.coverage == self.block_size() * self.block_size()
    }
}

/// The complete pyramid, finest level first
#[derive(Debug, Clone)]
pub struct QuadtreePyramid {
    padded_resolution: u32,
    levels: Vec<QuadtreeLevel>,
}

impl QuadtreePyramid {
    /// `log2(padded_resolution) + 1`
    pub fn depth_for(padded_resolution: u32) -> usize {
        padded_resolution.trailing_zeros() as usize + 1
    }

    /// Build every level from fine to coarse, one executor pass per level
    pub fn build<E: LevelExecutor>(lattice: &VertexLattice, executor: &E) -> Self {
        let padded_resolution = equivalent_power_of_two(lattice.width(), lattice.height());
        let depth = Self::depth_for(padded_resolution);

        let mut levels = Vec::with_capacity(depth);
        levels.push(Self::build_finest(lattice, padded_resolution, executor));

        for level in 1..depth as u32 {
            let finer = &levels[level as usize - 1];
            let next = Self::build_level(lattice, finer, level, padded_resolution >> level, executor);
            debug!(
                quadtree_level = level,
                side = next.side,
                full_nodes = next.nodes.iter().filter(|n| next.is_full(n)).count(),
                "Built quadtree level"
            );
            levels.push(next);
        }

        assert_eq!(levels.len(), depth, "quadtree depth mismatch");
        Self {
            padded_resolution,
            levels,
        }
    }

    fn build_finest<E: LevelExecutor>(
        lattice: &VertexLattice,
        side: u32,
        executor: &E,
    ) -> QuadtreeLevel {
        let nodes = executor.map_level((side * side) as usize, |k| {
            let (x, y) = (k as u32 % side, k as u32 / side);
            if !lattice.is_valid_pixel(x, y) {
                return QuadtreeNode::EMPTY;
            }
            QuadtreeNode {
                position: lattice.centre(x, y),
                accumulated_error: 0.0,
                coverage: 1,
            }
        });

        QuadtreeLevel {
            level: 0,
            side,
            nodes,
        }
    }

    fn build_level<E: LevelExecutor>(
        lattice: &VertexLattice,
        finer: &QuadtreeLevel,
        level: u32,
        side: u32,
        executor: &E,
    ) -> QuadtreeLevel {
        let block = 1u32 << level;
        let full_coverage = block * block;

        let nodes = executor.map_level((side * side) as usize, |k| {
            let (x, y) = (k as u32 % side, k as u32 / side);
            let children = [
                finer.node(2 * x, 2 * y),
                finer.node(2 * x + 1, 2 * y),
                finer.node(2 * x, 2 * y + 1),
                finer.node(2 * x + 1, 2 * y + 1),
            ];
            let coverage = children.iter().map(|c| c.coverage).sum();
            if coverage != full_coverage {
                return QuadtreeNode {
                    coverage,
                    ..QuadtreeNode::EMPTY
                };
            }

            let (x0, y0) = (x * block, y * block);
            let half = block / 2;
            // Full blocks never touch padding or invalid pixels, so every lattice point exists.
            let at = |i: u32, j: u32| {
                lattice
                    .corner(x0 + i, y0 + j)
                    .expect("full quadtree block with a missing corner vertex")
            };
            let patch = BilinearPatch {
                corners: [at(0, 0), at(block, 0), at(0, block), at(block, block)],
            };
            let centre = at(half, half);

            let mut local_error = patch.distance(0.5, 0.5, &centre);
            for (s, t, (i, j)) in [
                (0.5, 0.0, (half, 0)),
                (0.0, 0.5, (0, half)),
                (1.0, 0.5, (block, half)),
                (0.5, 1.0, (half, block)),
            ] {
                local_error = local_error.max(patch.distance(s, t, &at(i, j)));
            }
            for (child, (s, t)) in children
                .iter()
                .zip([(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)])
            {
                let position = child.position.expect("full quadtree child without a position");
                local_error = local_error.max(patch.distance(s, t, &position));
            }

            let child_error: f32 = children.iter().map(|c| c.accumulated_error).sum();
            QuadtreeNode {
                position: Some(centre),
                accumulated_error: child_error + local_error,
                coverage,
            }
        });

        QuadtreeLevel { level, side, nodes }
    }

    pub fn padded_resolution(&self) -> u32 {
        self.padded_resolution
    }

    /// Number of levels
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, level: u32) -> &QuadtreeLevel {
        &self.levels[level as usize]
    }

    pub fn levels(&self) -> &[QuadtreeLevel] {
        &self.levels
    }

    pub fn root(&self) -> &QuadtreeNode {
        &self.levels[self.levels.len() - 1].nodes[0]
    }
}

/// Bilinear surface through four corners ordered top-left, top-right, bottom-left, bottom-right
struct BilinearPatch {
    corners: [Point3f; 4],
}

impl BilinearPatch {
    fn eval(&self, s: f32, t: f32) -> Point3f {
        let [tl, tr, bl, br] = self.corners;
        let top = tl.coords * (1.0 - s) + tr.coords * s;
        let bottom = bl.coords * (1.0 - s) + br.coords * s;
        Point3f::from(top * (1.0 - t) + bottom * t)
    }

    fn distance(&self, s: f32, t: f32, actual: &Point3f) -> f32 {
        (self.eval(s, t) - actual).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::SequentialExecutor;
    use depthmesh_core::{CameraModel, DepthField};

    fn build(depth: &DepthField, project_3d: bool) -> QuadtreePyramid {
        let camera = CameraModel::perspective(depth.resolution(), (60.0, 60.0), (1.0, 5.0));
        let lattice = VertexLattice::build(&camera, depth, true, project_3d, &SequentialExecutor);
        QuadtreePyramid::build(&lattice, &SequentialExecutor)
    }

    #[test]
    fn test_depth_and_sides() {
        let pyramid = build(&DepthField::uniform(5, 3, 0.5).unwrap(), true);
        assert_eq!(pyramid.padded_resolution(), 8);
        assert_eq!(pyramid.depth(), 4);
        let sides: Vec<u32> = pyramid.levels().iter().map(|l| l.side).collect();
        assert_eq!(sides, vec![8, 4, 2, 1]);
    }

    #[test]
    fn test_padding_makes_nodes_mixed() {
        let pyramid = build(&DepthField::uniform(5, 3, 0.5).unwrap(), true);
        let finest = pyramid.level(0);
        assert!(finest.is_full(finest.node(4, 2)));
        assert!(finest.node(5, 2).is_empty());
        assert_eq!(pyramid.root().coverage, 15);
        assert!(!pyramid.level(3).is_full(pyramid.root()));
        assert!(pyramid.root().position.is_none());
    }

    #[test]
    fn test_error_accumulates_towards_root() {
        let depth = DepthField::from_fn(16, 16, |x, y| {
            0.3 + 0.2 * ((x as f32 * 0.7).sin() * (y as f32 * 0.4).cos())
        })
        .unwrap();
        let pyramid = build(&depth, true);

        for level in 1..pyramid.depth() as u32 {
            let coarse = pyramid.level(level);
            let finer = pyramid.level(level - 1);
            for y in 0..coarse.side {
                for x in 0..coarse.side {
                    let parent = coarse.node(x, y);
                    for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                        let child = finer.node(2 * x + dx, 2 * y + dy);
                        assert!(parent.accumulated_error >= child.accumulated_error);
                    }
                }
            }
        }
        assert!(pyramid.root().accumulated_error > 0.0);
    }

    #[test]
    fn test_flat_layout_has_no_error() {
        let depth = DepthField::from_fn(8, 8, |x, _| x as f32 / 8.0).unwrap();
        let pyramid = build(&depth, false);
        assert!(pyramid.root().accumulated_error < 1e-5);
    }

    #[test]
    fn test_bilinear_patch_corners() {
        let patch = BilinearPatch {
            corners: [
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(1.0, 1.0, 1.0),
            ],
        };
        assert_eq!(patch.eval(1.0, 1.0), Point3f::new(1.0, 1.0, 1.0));
        assert_eq!(patch.eval(0.5, 0.5), Point3f::new(0.5, 0.5, 0.25));
    }
}
