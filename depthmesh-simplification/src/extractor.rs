//! Top-down split decisions and leaf geometry emission
//!
//! Starting at the root, a node is refined into its four children unless it
//! is full and its accumulated error is strictly below the threshold. Mixed
//! nodes always split so no block straddles valid and invalid pixels, empty
//! nodes are skipped, and level-0 nodes are always leaves.
//!
//! Once every decision is known, the corners of all leaves are marked. Each
//! leaf then emits a fan around its centre vertex through every marked corner
//! on its boundary, so an edge shared with finer leaves is split at the same
//! vertices on both sides and no T-junction opens. A leaf without finer
//! neighbours emits four triangles. Triangles rejected by the disocclusion
//! filter are dropped on the spot.

use crate::disocclusion::DisocclusionFilter;
use crate::lattice::{LatticeKey, LatticePoint, VertexLattice};
use crate::parallel::LevelExecutor;
use crate::pyramid::{QuadtreeLevel, QuadtreeNode, QuadtreePyramid};
use tracing::debug;

/// Outcome of the split test for one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDecision {
    /// An ancestor already stopped or was skipped
    Unvisited,
    /// No valid pixel below this node
    Skip,
    /// Emit geometry for this block
    Leaf,
    /// Refine into the four children
    Split,
}

/// Geometry emitted by one leaf block
#[derive(Debug, Clone)]
struct LeafBlock {
    level: u32,
    /// `None` marks a triangle removed by the disocclusion filter
    triangles: Vec<Option<[LatticeKey; 3]>>,
    error: f32,
}

/// Sparse output of the extraction pass
#[derive(Debug, Clone)]
pub struct ExtractedGeometry {
    /// One flag per lattice slot, set when a kept triangle references it
    pub populated: Vec<bool>,
    /// Kept triangles as lattice keys, in emission order
    pub triangles: Vec<[LatticeKey; 3]>,
    pub leaf_count: usize,
    /// Sum of the accumulated errors of all leaves
    pub leaf_error_sum: f64,
    pub removed_triangle_count: usize,
    /// Leaves emitted per quadtree level, finest first
    pub leaves_per_level: Vec<usize>,
}

impl ExtractedGeometry {
    fn new(slot_count: usize, depth: usize) -> Self {
        Self {
            populated: vec![false; slot_count],
            triangles: Vec::new(),
            leaf_count: 0,
            leaf_error_sum: 0.0,
            removed_triangle_count: 0,
            leaves_per_level: vec![0; depth],
        }
    }

    fn push_leaf(&mut self, leaf: LeafBlock) {
        for triangle in leaf.triangles {
            match triangle {
                Some(keys) => {
                    for key in keys {
                        self.populated[key] = true;
                    }
                    self.triangles.push(keys);
                }
                None => self.removed_triangle_count += 1,
            }
        }
        self.leaf_count += 1;
        self.leaf_error_sum += leaf.error as f64;
        self.leaves_per_level[leaf.level as usize] += 1;
    }

    pub fn populated_count(&self) -> usize {
        self.populated.iter().filter(|&&p| p).count()
    }
}

/// Walks a finished pyramid from the root down
pub struct MeshExtractor<'a> {
    pyramid: &'a QuadtreePyramid,
    lattice: &'a VertexLattice,
    filter: DisocclusionFilter,
    error_threshold: f32,
}

impl<'a> MeshExtractor<'a> {
    pub fn new(
        pyramid: &'a QuadtreePyramid,
        lattice: &'a VertexLattice,
        filter: DisocclusionFilter,
        error_threshold: f32,
    ) -> Self {
        Self {
            pyramid,
            lattice,
            filter,
            error_threshold,
        }
    }

    /// Split test for a node whose parent decided to split
    pub fn decide(level: &QuadtreeLevel, node: &QuadtreeNode, error_threshold: f32) -> SplitDecision {
        if node.is_empty() {
            SplitDecision::Skip
        } else if level.level == 0 {
            SplitDecision::Leaf
        } else if !level.is_full(node) || node.accumulated_error >= error_threshold {
            SplitDecision::Split
        } else {
            SplitDecision::Leaf
        }
    }

    /// Decide level by level from the root, then emit every leaf
    pub fn extract<E: LevelExecutor>(&self, executor: &E) -> ExtractedGeometry {
        let depth = self.pyramid.depth();
        let decisions = self.decide_levels(executor);
        let used_corners = self.mark_leaf_corners(&decisions);

        let mut geometry = ExtractedGeometry::new(self.lattice.key_count(), depth);
        for (level, level_decisions) in (0..depth as u32).rev().zip(&decisions) {
            let quadtree_level = self.pyramid.level(level);
            let side = quadtree_level.side;

            let leaves = executor.map_level(level_decisions.len(), |k| {
                (level_decisions[k] == SplitDecision::Leaf).then(|| {
                    self.emit_leaf(quadtree_level, k as u32 % side, k as u32 / side, &used_corners)
                })
            });

            let before = geometry.leaf_count;
            for leaf in leaves.into_iter().flatten() {
                geometry.push_leaf(leaf);
            }
            debug!(
                quadtree_level = level,
                leaves = geometry.leaf_count - before,
                splits = level_decisions.iter().filter(|&&d| d == SplitDecision::Split).count(),
                "Extracted quadtree level"
            );
        }

        geometry
    }

    /// Split decisions for every level, root first
    fn decide_levels<E: LevelExecutor>(&self, executor: &E) -> Vec<Vec<SplitDecision>> {
        let depth = self.pyramid.depth();
        let mut decisions: Vec<Vec<SplitDecision>> = Vec::with_capacity(depth);

        for level in (0..depth as u32).rev() {
            let quadtree_level = self.pyramid.level(level);
            let side = quadtree_level.side;
            let parents = decisions.last().map(Vec::as_slice);

            let level_decisions = executor.map_level(quadtree_level.nodes.len(), |k| {
                let (x, y) = (k as u32 % side, k as u32 / side);
                if let Some(parents) = parents {
                    let parent = parents[((y / 2) * (side / 2) + x / 2) as usize];
                    if parent != SplitDecision::Split {
                        return SplitDecision::Unvisited;
                    }
                }
                Self::decide(quadtree_level, quadtree_level.node(x, y), self.error_threshold)
            });
            decisions.push(level_decisions);
        }

        decisions
    }

    /// One flag per lattice corner, set when the corner is a corner of some leaf
    fn mark_leaf_corners(&self, decisions: &[Vec<SplitDecision>]) -> Vec<bool> {
        let mut used = vec![false; self.lattice.corner_count()];
        let depth = self.pyramid.depth() as u32;

        for (level, level_decisions) in (0..depth).rev().zip(decisions) {
            let side = self.pyramid.level(level).side;
            let block = 1u32 << level;
            for (k, _) in level_decisions
                .iter()
                .enumerate()
                .filter(|&(_, &d)| d == SplitDecision::Leaf)
            {
                let (x0, y0) = (k as u32 % side * block, k as u32 / side * block);
                for (i, j) in [(0, 0), (block, 0), (block, block), (0, block)] {
                    used[self.lattice.key(LatticePoint::Corner { i: x0 + i, j: y0 + j })] = true;
                }
            }
        }

        used
    }

    fn emit_leaf(&self, level: &QuadtreeLevel, x: u32, y: u32, used_corners: &[bool]) -> LeafBlock {
        let block = level.block_size();
        let (x0, y0) = (x * block, y * block);
        let lattice = self.lattice;

        let centre = if level.level == 0 {
            lattice.key(LatticePoint::Centre { x, y })
        } else {
            lattice.key(LatticePoint::Corner {
                i: x0 + block / 2,
                j: y0 + block / 2,
            })
        };
        let corner = |i: u32, j: u32| lattice.key(LatticePoint::Corner { i: x0 + i, j: y0 + j });

        // Boundary walk tl -> tr -> br -> bl, counter-clockwise as seen from the camera.
        // Each side starts at its block corner and picks up the corners finer neighbours use.
        let sides: [fn(u32, u32) -> (u32, u32); 4] = [
            |t, _| (t, 0),
            |t, b| (b, t),
            |t, b| (b - t, b),
            |t, b| (0, b - t),
        ];
        let ring: Vec<LatticeKey> = sides
            .iter()
            .flat_map(|side| {
                (0..block).filter_map(move |t| {
                    let (i, j) = side(t, block);
                    let key = corner(i, j);
                    (t == 0 || used_corners[key]).then_some(key)
                })
            })
            .collect();

        let triangles = (0..ring.len())
            .map(|k| {
                let keys = [centre, ring[k], ring[(k + 1) % ring.len()]];
                let positions = keys.map(|key| {
                    lattice
                        .position(key)
                        .unwrap_or_else(|| panic!("leaf block references unset vertex slot {}", key))
                });
                (!self.filter.should_remove(&positions)).then_some(keys)
            })
            .collect();

        LeafBlock {
            level: level.level,
            triangles,
            error: level.node(x, y).accumulated_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::SequentialExecutor;
    use depthmesh_core::{CameraModel, DepthField};
    use std::collections::HashMap;

    fn extract(depth: &DepthField, threshold: f32) -> ExtractedGeometry {
        // A narrow frustum keeps the uniform-distance sphere close to planar.
        let camera = CameraModel::perspective(depth.resolution(), (10.0, 10.0), (1.0, 5.0));
        let lattice = VertexLattice::build(&camera, depth, true, true, &SequentialExecutor);
        let pyramid = QuadtreePyramid::build(&lattice, &SequentialExecutor);
        MeshExtractor::new(&pyramid, &lattice, DisocclusionFilter::disabled(), threshold)
            .extract(&SequentialExecutor)
    }

    #[test]
    fn test_zero_threshold_keeps_every_pixel() {
        let geometry = extract(&DepthField::uniform(4, 4, 0.5).unwrap(), 0.0);
        assert_eq!(geometry.leaf_count, 16);
        assert_eq!(geometry.triangles.len(), 64);
        assert_eq!(geometry.leaves_per_level, vec![16, 0, 0]);
        // 25 corners and 16 centres.
        assert_eq!(geometry.populated_count(), 41);
    }

    #[test]
    fn test_large_threshold_collapses_to_root() {
        let geometry = extract(&DepthField::uniform(4, 4, 0.5).unwrap(), 1.0);
        assert_eq!(geometry.leaf_count, 1);
        assert_eq!(geometry.triangles.len(), 4);
        assert_eq!(geometry.leaves_per_level, vec![0, 0, 1]);
    }

    #[test]
    fn test_mixed_blocks_split_to_pixels() {
        // Right column is background, so every block touching it must refine.
        let depth = DepthField::from_fn(4, 4, |x, _| if x == 3 { 1.0 } else { 0.5 }).unwrap();
        let geometry = extract(&depth, 1.0);
        // Two full 2x2 blocks on the left, the x == 2 column as single pixels.
        assert_eq!(geometry.leaves_per_level, vec![4, 2, 0]);
        // Each block picks up the pixel corner in the middle of its right edge.
        assert_eq!(geometry.triangles.len(), 5 + 5 + 4 * 4);
    }

    #[test]
    fn test_coarse_leaf_edges_match_finer_neighbours() {
        let depth = DepthField::from_fn(4, 4, |x, _| if x == 3 { 1.0 } else { 0.5 }).unwrap();
        let geometry = extract(&depth, 1.0);

        let mut edge_uses: HashMap<(LatticeKey, LatticeKey), usize> = HashMap::new();
        for triangle in &geometry.triangles {
            for k in 0..3 {
                let (a, b) = (triangle[k], triangle[(k + 1) % 3]);
                *edge_uses.entry((a.min(b), a.max(b))).or_default() += 1;
            }
        }

        // Corner keys of a 4x4 field are `j * 5 + i`; the valid region spans i in 0..=3.
        let on_outline = |key: LatticeKey| -> Option<(usize, usize)> {
            (key < 25).then(|| (key % 5, key / 5))
        };
        for (&(a, b), &uses) in &edge_uses {
            let outline = match (on_outline(a), on_outline(b)) {
                (Some((ia, ja)), Some((ib, jb))) => {
                    (ia == ib && (ia == 0 || ia == 3)) || (ja == jb && (ja == 0 || ja == 4))
                }
                _ => false,
            };
            assert_eq!(uses, if outline { 1 } else { 2 }, "edge {:?}", (a, b));
        }
    }

    #[test]
    fn test_decide() {
        let level = QuadtreeLevel {
            level: 1,
            side: 1,
            nodes: vec![],
        };
        let node = |coverage, accumulated_error| QuadtreeNode {
            position: None,
            accumulated_error,
            coverage,
        };
        assert_eq!(MeshExtractor::decide(&level, &node(0, 0.0), 0.5), SplitDecision::Skip);
        assert_eq!(MeshExtractor::decide(&level, &node(3, 0.0), 0.5), SplitDecision::Split);
        assert_eq!(MeshExtractor::decide(&level, &node(4, 0.1), 0.5), SplitDecision::Leaf);
        assert_eq!(MeshExtractor::decide(&level, &node(4, 0.5), 0.5), SplitDecision::Split);
        assert_eq!(MeshExtractor::decide(&level, &node(4, 0.0), 0.0), SplitDecision::Split);
    }
}
