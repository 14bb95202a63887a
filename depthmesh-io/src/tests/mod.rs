//! Test modules for depthmesh-io
//!
//! Files are written under the system temp directory and removed afterwards.

pub mod depth_image_tests;
pub mod obj_tests;
pub mod view_set_tests;

use std::path::PathBuf;

/// Fresh per-test scratch directory
pub(crate) fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("depthmesh-io-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
