//! Sequential processing of many source views with cancellation
//!
//! Cancellation is checked once before each view. A view that has started
//! always runs to completion; cancelling only discards the views not yet
//! started.

use crate::generator::GeneratedMesh;
use crate::method::DepthMesher;
use depthmesh_core::{CameraModel, DepthField, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared flag used to stop a running batch between views
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One source view to mesh
#[derive(Debug, Clone)]
pub struct ViewInput {
    pub name: String,
    pub camera: CameraModel,
    pub depth: DepthField,
}

/// Mesh produced for one view
#[derive(Debug, Clone)]
pub struct ViewOutput {
    pub name: String,
    pub index: usize,
    pub result: GeneratedMesh,
}

/// Progress notification sent before each view starts
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress<'a> {
    pub index: usize,
    pub total: usize,
    pub name: &'a str,
}

impl BatchProgress<'_> {
    /// Fraction of views finished before this one, in [0, 1)
    pub fn fraction(&self) -> f32 {
        self.index as f32 / self.total.max(1) as f32
    }
}

/// Result of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub completed: Vec<ViewOutput>,
    /// Views skipped because the batch was cancelled
    pub discarded: usize,
    pub cancelled: bool,
}

/// Runs a [`DepthMesher`] over a list of views
pub struct BatchRunner<M: DepthMesher> {
    method: M,
    token: CancellationToken,
}

impl<M: DepthMesher> BatchRunner<M> {
    pub fn new(method: M) -> Self {
        Self::with_token(method, CancellationToken::new())
    }

    pub fn with_token(method: M, token: CancellationToken) -> Self {
        Self { method, token }
    }

    /// Token that cancels this runner
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn method(&self) -> &M {
        &self.method
    }

    /// Mesh every view in order.
    ///
    /// Views are pulled lazily, so loading can happen inside the iterator. The
    /// first view that fails to load or mesh aborts the batch with its error.
    pub fn run<I>(&self, views: I) -> Result<BatchReport>
    where
        I: IntoIterator<Item = Result<ViewInput>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.run_with_progress(views, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_progress` before each view
    #[tracing::instrument(skip_all, fields(method = self.method.name()))]
    pub fn run_with_progress<I, P>(&self, views: I, mut on_progress: P) -> Result<BatchReport>
    where
        I: IntoIterator<Item = Result<ViewInput>>,
        I::IntoIter: ExactSizeIterator,
        P: FnMut(BatchProgress<'_>),
    {
        let mut views = views.into_iter();
        let total = views.len();
        let mut report = BatchReport::default();

        for index in 0..total {
            if self.token.is_cancelled() {
                report.cancelled = true;
                report.discarded = total - index;
                warn!(processed = index, discarded = report.discarded, "Batch cancelled");
                return Ok(report);
            }

            let Some(view) = views.next() else { break };
            let view = view?;
            on_progress(BatchProgress {
                index,
                total,
                name: &view.name,
            });

            let result = self.method.mesh(&view.camera, &view.depth).map_err(|e| {
                error!(view = %view.name, "Mesh generation failed: {}", e);
                e
            })?;
            report.completed.push(ViewOutput {
                name: view.name,
                index,
                result,
            });
        }

        info!(views = report.completed.len(), "Batch finished");
        Ok(report)
    }
}
