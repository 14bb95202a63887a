//! JSON manifests listing the source views of a scene
//!
//! ```json
//! {
//!   "views": [
//!     {
//!       "name": "cam0",
//!       "camera": {
//!         "projection": { "type": "perspective", "field_of_view": [60.0, 45.0] },
//!         "pixel_resolution": [640, 480],
//!         "distance_range": [0.3, 20.0]
//!       },
//!       "depth_image": "depth/cam0.png"
//!     }
//!   ]
//! }
//! ```
//!
//! Relative depth image paths resolve against the manifest's directory.

use crate::{DepthReader, IoError, PngDepthCodec};
use depthmesh_core::{CameraModel, Result};
use depthmesh_simplification::ViewInput;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One source view in a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEntry {
    pub name: String,
    pub camera: CameraModel,
    pub depth_image: PathBuf,
}

/// Ordered list of source views
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewSet {
    pub views: Vec<ViewEntry>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl ViewSet {
    pub fn new(views: Vec<ViewEntry>) -> Self {
        Self {
            views,
            base_dir: PathBuf::new(),
        }
    }

    /// Read a manifest; its directory becomes the base for relative paths
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IoError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => IoError::Io(e),
        })?;
        let mut set: ViewSet = serde_json::from_reader(BufReader::new(file)).map_err(IoError::from)?;
        set.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        for entry in &set.views {
            entry.camera.validate()?;
        }
        info!(path = %path.display(), views = set.views.len(), "Loaded view manifest");
        Ok(set)
    }

    /// Write the manifest as pretty-printed JSON
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(IoError::from)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Directory relative depth image paths resolve against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn depth_image_path(&self, entry: &ViewEntry) -> PathBuf {
        self.base_dir.join(&entry.depth_image)
    }

    /// Load one view's depth image.
    ///
    /// The camera's pixel resolution follows the image actually read.
    pub fn load_view(&self, entry: &ViewEntry) -> Result<ViewInput> {
        let depth = PngDepthCodec::read_depth(self.depth_image_path(entry))?;
        let mut camera = entry.camera;
        if camera.pixel_resolution != depth.resolution() {
            warn!(
                view = %entry.name,
                declared = ?camera.pixel_resolution,
                actual = ?depth.resolution(),
                "Depth image resolution differs from camera, using image resolution"
            );
            camera = camera.with_pixel_resolution(depth.resolution());
        }
        Ok(ViewInput {
            name: entry.name.clone(),
            camera,
            depth,
        })
    }

    /// Lazily load every view in manifest order
    pub fn inputs(&self) -> impl ExactSizeIterator<Item = Result<ViewInput>> + '_ {
        self.views.iter().map(move |entry| self.load_view(entry))
    }
}
