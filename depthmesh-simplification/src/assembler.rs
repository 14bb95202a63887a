//! Compaction of the sparse extraction output into an indexed mesh

use crate::extractor::ExtractedGeometry;
use crate::lattice::VertexLattice;
use depthmesh_core::{Aabb, TriangleMesh};

/// Dense mesh with recomputed normals and bounds
#[derive(Debug, Clone)]
pub struct AssembledMesh {
    pub mesh: TriangleMesh,
    /// `None` when no triangle survived
    pub bounds: Option<Aabb>,
}

/// Build the final mesh from the populated lattice slots.
///
/// Vertices are numbered in lattice-key order, which keeps the output
/// independent of how the extraction was scheduled.
///
/// # Panics
///
/// If a triangle references a slot that was never populated or has no
/// position. Either means the extraction produced inconsistent geometry.
pub fn assemble(geometry: &ExtractedGeometry, lattice: &VertexLattice) -> AssembledMesh {
    assert_eq!(
        geometry.populated.len(),
        lattice.key_count(),
        "sparse vertex buffer does not match the lattice"
    );

    let mut remap: Vec<Option<usize>> = vec![None; geometry.populated.len()];
    let mut vertices = Vec::new();
    let mut uvs = Vec::new();

    for (key, _) in geometry.populated.iter().enumerate().filter(|(_, &p)| p) {
        let position = lattice
            .position(key)
            .unwrap_or_else(|| panic!("populated vertex slot {} has no position", key));
        remap[key] = Some(vertices.len());
        vertices.push(position);
        uvs.push(lattice.uv(key));
    }

    let faces = geometry
        .triangles
        .iter()
        .map(|triangle| {
            triangle.map(|key| {
                remap[key].unwrap_or_else(|| panic!("triangle references unpopulated vertex slot {}", key))
            })
        })
        .collect();

    let bounds = Aabb::from_points(&vertices);
    let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    mesh.set_uvs(uvs);
    mesh.compute_vertex_normals();

    AssembledMesh { mesh, bounds }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disocclusion::DisocclusionFilter;
    use crate::extractor::MeshExtractor;
    use crate::lattice::{LatticePoint, VertexLattice};
    use crate::parallel::SequentialExecutor;
    use crate::pyramid::QuadtreePyramid;
    use depthmesh_core::{CameraModel, DepthField};

    fn setup(threshold: f32) -> (VertexLattice, ExtractedGeometry) {
        let depth = DepthField::uniform(2, 2, 0.25).unwrap();
        let camera = CameraModel::perspective((2, 2), (40.0, 40.0), (1.0, 5.0));
        let lattice = VertexLattice::build(&camera, &depth, true, true, &SequentialExecutor);
        let pyramid = QuadtreePyramid::build(&lattice, &SequentialExecutor);
        let geometry = MeshExtractor::new(&pyramid, &lattice, DisocclusionFilter::disabled(), threshold)
            .extract(&SequentialExecutor);
        (lattice, geometry)
    }

    #[test]
    fn test_compaction() {
        let (lattice, geometry) = setup(0.0);
        let assembled = assemble(&geometry, &lattice);
        assert_eq!(assembled.mesh.vertex_count(), 9 + 4);
        assert_eq!(assembled.mesh.face_count(), 16);
        assert_eq!(assembled.mesh.uvs.as_ref().map(Vec::len), Some(13));
        assert!(assembled.mesh.faces.iter().flatten().all(|&i| i < 13));
    }

    #[test]
    fn test_normals_face_camera() {
        let (lattice, geometry) = setup(0.0);
        let assembled = assemble(&geometry, &lattice);
        for (v, n) in assembled.mesh.vertices.iter().zip(assembled.mesh.normals.as_ref().unwrap()) {
            assert!(n.dot(&v.coords) < 0.0);
        }
    }

    #[test]
    fn test_bounds_contain_vertices() {
        let (lattice, geometry) = setup(1.0);
        let assembled = assemble(&geometry, &lattice);
        let bounds = assembled.bounds.unwrap();
        assert!(assembled.mesh.vertices.iter().all(|v| bounds.contains(v)));
    }

    #[test]
    #[should_panic(expected = "unpopulated vertex slot")]
    fn test_unpopulated_reference_panics() {
        let (lattice, mut geometry) = setup(0.0);
        let centre = lattice.key(LatticePoint::Centre { x: 0, y: 0 });
        geometry.populated[centre] = false;
        assemble(&geometry, &lattice);
    }
}
