//! Level-synchronous parallel execution
//!
//! Both quadtree passes process one level at a time: every node of a level is
//! independent, but level `L + 1` reads all of level `L`. A [`LevelExecutor`]
//! maps a closure over the nodes of one level and only returns once the whole
//! level is done, which is the barrier between levels.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use depthmesh_core::{Error, Result};

/// Runs one quadtree level as a data-parallel map
pub trait LevelExecutor: Sync {
    /// Evaluate `f` for every index in `0..count`, returning results in index order
    fn map_level<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;
}

/// Single-threaded executor, mostly useful for debugging and tiny inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl LevelExecutor for SequentialExecutor {
    fn map_level<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        (0..count).map(f).collect()
    }
}

/// Thread pool configuration for the rayon executor
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of threads to use (None = automatic)
    pub num_threads: Option<usize>,
    /// Thread stack size in bytes
    pub stack_size: Option<usize>,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// Levels with fewer nodes than this run sequentially
    pub min_parallel_len: usize,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            stack_size: None,
            thread_name_prefix: "depthmesh".to_string(),
            min_parallel_len: 1024,
        }
    }
}

impl ThreadPoolConfig {
    /// Set number of threads
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Set stack size
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Set the sequential cut-off for small levels
    pub fn with_min_parallel_len(mut self, min_parallel_len: usize) -> Self {
        self.min_parallel_len = min_parallel_len;
        self
    }
}

/// Executor backed by rayon, either the global pool or a dedicated one
#[derive(Debug, Clone)]
pub struct RayonExecutor {
    pool: Option<Arc<ThreadPool>>,
    min_parallel_len: usize,
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self {
            pool: None,
            min_parallel_len: ThreadPoolConfig::default().min_parallel_len,
        }
    }
}

impl RayonExecutor {
    /// Use rayon's global thread pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dedicated thread pool from `config`
    pub fn with_config(config: &ThreadPoolConfig) -> Result<Self> {
        let mut builder = ThreadPoolBuilder::new();

        if let Some(num_threads) = config.num_threads {
            builder = builder.num_threads(num_threads);
        }

        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        if !config.thread_name_prefix.is_empty() {
            let prefix = config.thread_name_prefix.clone();
            builder = builder.thread_name(move |index| format!("{}-{}", prefix, index));
        }

        let pool = builder
            .build()
            .map_err(|e| Error::Algorithm(format!("Failed to create thread pool: {}", e)))?;

        Ok(Self {
            pool: Some(Arc::new(pool)),
            min_parallel_len: config.min_parallel_len,
        })
    }

    /// Number of worker threads this executor can use
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl LevelExecutor for RayonExecutor {
    fn map_level<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        if count < self.min_parallel_len {
            return (0..count).map(f).collect();
        }

        match &self.pool {
            Some(pool) => pool.install(|| (0..count).into_par_iter().map(f).collect()),
            None => (0..count).into_par_iter().map(f).collect(),
        }
    }
}
