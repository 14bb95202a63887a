//! OBJ output of generated meshes

use super::scratch_dir;
use crate::*;
use depthmesh_core::{Point3f, TriangleMesh, Vector3f};
use std::fs;

fn textured_quad() -> TriangleMesh {
    let mut mesh = TriangleMesh::from_vertices_and_faces(
        vec![
            Point3f::new(-1.0, -1.0, 2.0),
            Point3f::new(1.0, -1.0, 2.0),
            Point3f::new(1.0, 1.0, 2.0),
            Point3f::new(-1.0, 1.0, 2.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    );
    mesh.set_uvs(vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]);
    mesh.set_normals(vec![Vector3f::new(0.0, 0.0, -1.0); 4]);
    mesh
}

fn records<'a>(text: &'a str, tag: &str) -> Vec<&'a str> {
    text.lines().filter(|l| l.split_whitespace().next() == Some(tag)).collect()
}

#[test]
fn test_obj_records() {
    let mut out = Vec::new();
    ObjWriter::write_to(&textured_quad(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(records(&text, "v").len(), 4);
    assert_eq!(records(&text, "vt").len(), 4);
    assert_eq!(records(&text, "vn").len(), 4);
    assert_eq!(records(&text, "f"), vec!["f 1/1/1 2/2/2 3/3/3", "f 1/1/1 3/3/3 4/4/4"]);
    assert_eq!(records(&text, "v")[0], "v -1 -1 2");
}

#[test]
fn test_obj_without_attributes() {
    let mesh = TriangleMesh::from_vertices_and_faces(
        vec![Point3f::origin(), Point3f::new(1.0, 0.0, 0.0), Point3f::new(0.0, 1.0, 0.0)],
        vec![[0, 1, 2]],
    );
    let mut out = Vec::new();
    ObjWriter::write_to(&mesh, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(records(&text, "vt").is_empty());
    assert!(records(&text, "vn").is_empty());
    assert_eq!(records(&text, "f"), vec!["f 1 2 3"]);
}

#[test]
fn test_write_mesh_by_extension() {
    let dir = scratch_dir("obj");
    let path = dir.join("view.obj");
    write_mesh(&textured_quad(), &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(records(&text, "f").len(), 2);

    assert!(write_mesh(&textured_quad(), dir.join("view.stl")).is_err());
    let _ = fs::remove_dir_all(dir);
}
