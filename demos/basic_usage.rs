//! Basic usage example for depthmesh
//!
//! Builds a synthetic depth field in memory, simplifies it at a few error
//! thresholds and prints the compression statistics of each run.

use depthmesh_core::{CameraModel, DepthField, Drawable};
use depthmesh_simplification::{DisocclusionHandling, MeshGenerator, SimplificationParams};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    println!("depthmesh Basic Usage");
    println!("=====================");

    // A tilted floor with a sphere in front of a background wall
    let (width, height) = (256, 192);
    let camera = CameraModel::perspective((width, height), (70.0, 55.0), (0.5, 12.0));
    let depth = DepthField::from_fn(width, height, |x, y| {
        let (cx, cy) = (x as f32 - 128.0, y as f32 - 96.0);
        let r2 = cx * cx + cy * cy;
        if r2 < 50.0 * 50.0 {
            0.15 + r2 / (50.0 * 50.0) * 0.05
        } else if y > 120 {
            0.6 - (y - 120) as f32 * 0.004
        } else {
            1.0
        }
    })?;
    println!("Depth field: {}x{} pixels", depth.width(), depth.height());

    for threshold in [0.0, 0.005, 0.02, 0.1] {
        let params = SimplificationParams::new().with_error_threshold(threshold);
        let result = MeshGenerator::new(params).generate(&camera, &depth)?;
        let (min, max) = result.mesh.bounding_box();

        println!("\nThreshold {} m:", threshold);
        for line in result.stats.summary_lines() {
            println!("  {}", line);
        }
        println!(
            "  {} vertices, bounds ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
            result.mesh.vertex_count(),
            min.x,
            min.y,
            min.z,
            max.x,
            max.y,
            max.z
        );
    }

    // The sphere silhouette in front of the floor produces stretched triangles
    let kept = MeshGenerator::new(
        SimplificationParams::new().with_disocclusion_handling(DisocclusionHandling::NoHandling),
    )
    .generate(&camera, &depth)?;
    let removed = MeshGenerator::new(SimplificationParams::new()).generate(&camera, &depth)?;
    println!(
        "\nDisocclusion edges: {} of {} triangles removed",
        removed.stats.removed_triangle_count,
        kept.mesh.face_count()
    );

    Ok(())
}
