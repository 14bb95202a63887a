//! View manifests and lazy view loading

use super::scratch_dir;
use crate::*;
use depthmesh_core::{CameraModel, DepthField, Error, Projection};
use depthmesh_simplification::{BatchRunner, GeometryMethod};
use std::fs;

const MANIFEST: &str = r#"{
  "views": [
    {
      "name": "front",
      "camera": {
        "projection": { "type": "perspective", "field_of_view": [60.0, 45.0] },
        "pixel_resolution": [8, 6],
        "distance_range": [0.3, 20.0]
      },
      "depth_image": "depth/front.png"
    },
    {
      "name": "pano",
      "camera": {
        "projection": { "type": "omnidirectional" },
        "pixel_resolution": [16, 8],
        "distance_range": [0.3, 20.0]
      },
      "depth_image": "depth/pano.png"
    }
  ]
}"#;

fn write_scene(name: &str) -> std::path::PathBuf {
    let dir = scratch_dir(name);
    fs::create_dir_all(dir.join("depth")).unwrap();
    write_depth_image(&DepthField::uniform(8, 6, 0.25).unwrap(), dir.join("depth/front.png")).unwrap();
    // Declared 16x8 in the manifest, stored at half resolution.
    write_depth_image(&DepthField::uniform(8, 4, 0.5).unwrap(), dir.join("depth/pano.png")).unwrap();
    fs::write(dir.join("views.json"), MANIFEST).unwrap();
    dir
}

#[test]
fn test_parse_manifest() {
    let dir = write_scene("parse");
    let set = ViewSet::from_file(dir.join("views.json")).unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(set.base_dir(), dir.as_path());
    assert_eq!(set.views[0].name, "front");
    assert_eq!(
        set.views[0].camera.projection,
        Projection::Perspective { field_of_view: (60.0, 45.0) }
    );
    assert!(set.views[1].camera.is_omnidirectional());
    assert_eq!(set.depth_image_path(&set.views[1]), dir.join("depth/pano.png"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_load_views_follow_image_resolution() {
    let dir = write_scene("load");
    let set = ViewSet::from_file(dir.join("views.json")).unwrap();
    let inputs: Vec<_> = set.inputs().map(|v| v.unwrap()).collect();

    assert_eq!(inputs[0].camera.pixel_resolution, (8, 6));
    assert_eq!(inputs[1].camera.pixel_resolution, (8, 4));
    assert_eq!(inputs[1].depth.resolution(), (8, 4));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_batch_over_manifest() {
    let dir = write_scene("batch");
    let set = ViewSet::from_file(dir.join("views.json")).unwrap();
    let runner = BatchRunner::new(GeometryMethod::FullResolution {
        remove_background: true,
        project_3d: true,
    });
    let report = runner.run(set.inputs()).unwrap();

    assert_eq!(report.completed.len(), 2);
    assert_eq!(report.completed[0].result.mesh.face_count(), 4 * 8 * 6);
    assert_eq!(report.completed[1].result.mesh.face_count(), 4 * 8 * 4);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_manifest_round_trip() {
    let dir = scratch_dir("round_trip");
    let set = ViewSet::new(vec![ViewEntry {
        name: "cam".to_string(),
        camera: CameraModel::perspective((32, 32), (40.0, 40.0), (0.1, 5.0)),
        depth_image: "cam.png".into(),
    }]);
    set.to_file(dir.join("views.json")).unwrap();
    let loaded = ViewSet::from_file(dir.join("views.json")).unwrap();
    assert_eq!(loaded.views, set.views);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_invalid_manifests() {
    let dir = scratch_dir("invalid");
    assert!(matches!(ViewSet::from_file(dir.join("missing.json")), Err(Error::Io(_))));

    fs::write(dir.join("broken.json"), "{ \"views\": [ { \"name\": 3 } ] }").unwrap();
    assert!(matches!(ViewSet::from_file(dir.join("broken.json")), Err(Error::InvalidData(_))));

    let bad_camera = MANIFEST.replace("[0.3, 20.0]", "[5.0, 1.0]");
    fs::write(dir.join("bad_camera.json"), bad_camera).unwrap();
    assert!(ViewSet::from_file(dir.join("bad_camera.json")).is_err());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn test_missing_image_fails_lazily() {
    let dir = write_scene("lazy");
    fs::remove_file(dir.join("depth/pano.png")).unwrap();
    let set = ViewSet::from_file(dir.join("views.json")).unwrap();

    let mut inputs = set.inputs();
    assert_eq!(inputs.len(), 2);
    assert!(inputs.next().unwrap().is_ok());
    assert!(inputs.next().unwrap().is_err());

    let _ = fs::remove_dir_all(dir);
}
