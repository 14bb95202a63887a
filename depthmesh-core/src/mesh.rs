//! Mesh data structures and functionality

use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices, faces and optional per-vertex attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub uvs: Option<Vec<Uv>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            uvs: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
            uvs: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Recompute smooth vertex normals.
    ///
    /// Unnormalized face cross products are accumulated at each vertex, so
    /// larger faces weigh more; the sums are normalized afterwards. Vertices
    /// touched only by degenerate faces fall back to +Z.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vector3f::zeros(); self.vertices.len()];

        for face in &self.faces {
            let n = self.face_cross(face);
            for &vi in face {
                normals[vi] += n;
            }
        }

        for normal in &mut normals {
            let len = normal.norm();
            *normal = if len > 1e-12 {
                *normal / len
            } else {
                Vector3f::new(0.0, 0.0, 1.0)
            };
        }

        self.normals = Some(normals);
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set texture coordinates
    pub fn set_uvs(&mut self, uvs: Vec<Uv>) {
        if uvs.len() == self.vertices.len() {
            self.uvs = Some(uvs);
        }
    }

    fn face_cross(&self, face: &[usize; 3]) -> Vector3f {
        let v0 = self.vertices[face[0]];
        let v1 = self.vertices[face[1]];
        let v2 = self.vertices[face[2]];
        (v1 - v0).cross(&(v2 - v0))
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_quad() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_counts() {
        let mesh = make_quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert!(!mesh.is_empty());
        assert!(TriangleMesh::new().is_empty());
    }

    #[test]
    fn test_vertex_normals_planar() {
        let mut mesh = make_quad();
        mesh.compute_vertex_normals();
        for n in mesh.normals.as_ref().unwrap() {
            assert_relative_eq!(n.z, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_vertex_normals_are_area_weighted() {
        // A large face in the XY plane and a tiny face tilted towards +X share vertex 0.
        let mut mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(10.0, 0.0, 0.0),
                Point3f::new(0.0, 10.0, 0.0),
                Point3f::new(0.0, 0.0, 0.1),
                Point3f::new(0.0, 0.1, 0.0),
            ],
            vec![[0, 1, 2], [0, 4, 3]],
        );
        mesh.compute_vertex_normals();
        let n0 = mesh.normals.as_ref().unwrap()[0];
        assert!(n0.z > 0.99);
        assert!(n0.x > 0.0);
    }

    #[test]
    fn test_set_attributes_requires_matching_length() {
        let mut mesh = make_quad();
        mesh.set_uvs(vec![[0.0, 0.0]]);
        assert!(mesh.uvs.is_none());
        mesh.set_uvs(vec![[0.0, 0.0]; 4]);
        assert_eq!(mesh.uvs.as_ref().map(Vec::len), Some(4));
    }
}
