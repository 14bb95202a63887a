//! Write a synthetic multi-view scene for the `depthmesh` tool
//!
//! Renders analytic depth images of random boxes on a ground plane from a
//! ring of cameras, plus one omnidirectional view, and writes them with a
//! `views.json` manifest.
//!
//! ```text
//! synthetic_scene --output scene --views 6
//! depthmesh scene/views.json --output meshes
//! ```

use anyhow::Result;
use clap::Parser;
use depthmesh_core::{CameraModel, DepthField, Vector3f};
use depthmesh_io::{write_depth_image, ViewEntry, ViewSet};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "synthetic_scene")]
#[command(about = "Write a synthetic depth image scene")]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = "scene")]
    output: PathBuf,

    /// Number of perspective views on the camera ring
    #[arg(short, long, default_value_t = 4)]
    views: usize,

    /// Side length of the perspective depth images
    #[arg(short, long, default_value_t = 512)]
    resolution: u32,

    /// Random seed for the box layout
    #[arg(short, long, default_value_t = 7)]
    seed: u64,
}

/// Axis-aligned box in world space
struct Block {
    min: Vector3f,
    max: Vector3f,
}

impl Block {
    /// Slab test, returning the entry distance along a unit ray
    fn intersect(&self, origin: &Vector3f, dir: &Vector3f) -> Option<f32> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for i in 0..3 {
            if dir[i].abs() < 1e-8 {
                if origin[i] < self.min[i] || origin[i] > self.max[i] {
                    return None;
                }
                continue;
            }
            let t0 = (self.min[i] - origin[i]) / dir[i];
            let t1 = (self.max[i] - origin[i]) / dir[i];
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
        }
        (t_near <= t_far && t_far > 0.0).then_some(t_near.max(0.0))
    }
}

struct Scene {
    blocks: Vec<Block>,
    ground: f32,
}

impl Scene {
    fn random(rng: &mut StdRng) -> Self {
        let blocks = (0..8)
            .map(|_| {
                let center = Vector3f::new(rng.gen_range(-3.0..3.0), 0.0, rng.gen_range(-3.0..3.0));
                let half = Vector3f::new(rng.gen_range(0.2..0.8), rng.gen_range(0.3..1.5), rng.gen_range(0.2..0.8));
                Block {
                    min: center - Vector3f::new(half.x, 0.0, half.z),
                    max: center + Vector3f::new(half.x, 2.0 * half.y, half.z),
                }
            })
            .collect();
        Self { blocks, ground: 0.0 }
    }

    fn trace(&self, origin: &Vector3f, dir: &Vector3f) -> Option<f32> {
        let ground = (dir.y < -1e-6).then(|| (self.ground - origin.y) / dir.y);
        self.blocks
            .iter()
            .filter_map(|b| b.intersect(origin, dir))
            .chain(ground)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Depth image of the scene seen from `origin`, camera yawed by `yaw` radians
    fn render(&self, camera: &CameraModel, origin: Vector3f, yaw: f32) -> Result<DepthField> {
        let (width, height) = camera.pixel_resolution;
        let (near, far) = camera.distance_range;
        let (sin, cos) = yaw.sin_cos();
        let depth = DepthField::from_fn(width, height, |x, y| {
            let u = (x as f32 + 0.5) / width as f32;
            let v = (y as f32 + 0.5) / height as f32;
            let local = camera.ray(u, v).normalize();
            let dir = Vector3f::new(cos * local.x + sin * local.z, local.y, -sin * local.x + cos * local.z);
            match self.trace(&origin, &dir) {
                Some(t) if t < far => ((t - near) / (far - near)).max(0.0),
                _ => 1.0,
            }
        })?;
        Ok(depth)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let scene = Scene::random(&mut rng);
    fs::create_dir_all(args.output.join("depth"))?;

    let mut entries = Vec::with_capacity(args.views + 1);
    let eye_height = 1.6;
    for i in 0..args.views {
        let angle = i as f32 / args.views as f32 * std::f32::consts::TAU;
        let origin = Vector3f::new(8.0 * angle.sin(), eye_height, 8.0 * angle.cos());
        // Looking back at the scene centre
        let yaw = angle + std::f32::consts::PI;
        let camera = CameraModel::perspective((args.resolution, args.resolution), (60.0, 60.0), (0.3, 20.0));
        let name = format!("ring_{:02}", i);
        let depth_image = PathBuf::from("depth").join(format!("{}.png", name));
        write_depth_image(&scene.render(&camera, origin, yaw)?, args.output.join(&depth_image))?;
        info!(view = %name, "Rendered");
        entries.push(ViewEntry { name, camera, depth_image });
    }

    let pano = CameraModel::omnidirectional((2 * args.resolution, args.resolution), (0.3, 20.0));
    let depth_image = PathBuf::from("depth/pano.png");
    write_depth_image(
        &scene.render(&pano, Vector3f::new(0.0, eye_height, 5.0), 0.0)?,
        args.output.join(&depth_image),
    )?;
    entries.push(ViewEntry {
        name: "pano".to_string(),
        camera: pano,
        depth_image,
    });

    let manifest = args.output.join("views.json");
    ViewSet::new(entries).to_file(&manifest)?;
    println!("Wrote {}", manifest.display());
    Ok(())
}
