//! Mesh every view of a scene manifest
//!
//! Reads a JSON view manifest, simplifies each depth image into a mesh and
//! writes one OBJ per view plus a `stats.json` summary.
//!
//! ```text
//! depthmesh scene/views.json --output meshes --threshold 0.02
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use depthmesh_io::{write_mesh, ViewSet};
use depthmesh_simplification::{
    BatchRunner, DisocclusionHandling, MeshGenerator, RayonExecutor, SimplificationParams, ThreadPoolConfig,
};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Disocclusion {
    /// Keep every triangle
    None,
    /// Remove stretched triangles at depth discontinuities
    RemoveEdges,
}

/// Per-view depth map to mesh simplification
#[derive(Parser, Debug)]
#[command(name = "depthmesh")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON view manifest
    manifest: PathBuf,

    /// Directory receiving the OBJ files and stats.json
    #[arg(short, long, default_value = "meshes")]
    output: PathBuf,

    /// JSON file with simplification parameters; flags below override it
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Fitting error threshold in meters
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Disocclusion handling
    #[arg(long, value_enum)]
    disocclusion: Option<Disocclusion>,

    /// Orthogonality parameter of the edge filter, in [0, 1]
    #[arg(long)]
    orthogonality: Option<f32>,

    /// Triangle size parameter of the edge filter, in [0, 1]
    #[arg(long)]
    triangle_size: Option<f32>,

    /// Keep geometry on the far plane
    #[arg(long)]
    keep_background: bool,

    /// Emit the flattened layout instead of 3D positions
    #[arg(long)]
    flat: bool,

    /// Longest depth image side processed before downscaling
    #[arg(long)]
    max_resolution: Option<u32>,

    /// Skip simplification and edge removal entirely
    #[arg(long)]
    full_resolution: bool,

    /// Worker threads (defaults to the global rayon pool)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn simplification_params(&self) -> Result<SimplificationParams> {
        let mut params = match &self.params {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read parameters from {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("invalid parameters in {}", path.display()))?
            }
            None => SimplificationParams::default(),
        };

        if self.full_resolution {
            params = SimplificationParams {
                remove_background: params.remove_background,
                project_3d: params.project_3d,
                max_resolution: params.max_resolution,
                ..SimplificationParams::full_resolution()
            };
        }
        if let Some(threshold) = self.threshold {
            params = params.with_error_threshold(threshold);
        }
        if let Some(mode) = self.disocclusion {
            params = params.with_disocclusion_handling(match mode {
                Disocclusion::None => DisocclusionHandling::NoHandling,
                Disocclusion::RemoveEdges => DisocclusionHandling::RemoveEdgeTriangles,
            });
        }
        if let Some(orthogonality) = self.orthogonality {
            params = params.with_orthogonality(orthogonality);
        }
        if let Some(size) = self.triangle_size {
            params = params.with_triangle_size(size);
        }
        if self.keep_background {
            params = params.with_remove_background(false);
        }
        if self.flat {
            params = params.with_project_3d(false);
        }
        if let Some(max_resolution) = self.max_resolution {
            params = params.with_max_resolution(max_resolution);
        }

        params.validate()?;
        Ok(params)
    }
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let params = args.simplification_params()?;
    let executor = match args.threads {
        Some(threads) => RayonExecutor::with_config(&ThreadPoolConfig::default().with_threads(threads))?,
        None => RayonExecutor::new(),
    };
    info!(?params, threads = executor.num_threads(), "Starting");

    let views = ViewSet::from_file(&args.manifest)
        .with_context(|| format!("failed to load manifest {}", args.manifest.display()))?;
    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let runner = BatchRunner::new(MeshGenerator::with_executor(params, executor));
    let report = runner.run_with_progress(views.inputs(), |progress| {
        info!(
            view = progress.name,
            "[{}/{}] {:.0}%",
            progress.index + 1,
            progress.total,
            progress.fraction() * 100.0
        );
    })?;

    let mut summary = Vec::with_capacity(report.completed.len());
    for view in &report.completed {
        let path = args.output.join(format!("{}.obj", view.name));
        write_mesh(&view.result.mesh, &path).with_context(|| format!("failed to write {}", path.display()))?;

        println!("{}", view.name);
        for line in view.result.stats.summary_lines() {
            println!("  {}", line);
        }
        summary.push(serde_json::json!({
            "name": view.name,
            "mesh": path.file_name().map(|n| n.to_string_lossy().into_owned()),
            "processed_resolution": view.result.processed_resolution,
            "stats": view.result.stats,
        }));
    }

    let stats_path = args.output.join("stats.json");
    fs::write(&stats_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("failed to write {}", stats_path.display()))?;
    info!(views = report.completed.len(), output = %args.output.display(), "Done");
    Ok(())
}
