//! Parallel processing utilities for grid sampling
//!
//! This module provides configurable thread pool management for the
//! embarrassingly parallel parts of extraction: sampling the corner lattice
//! and classifying cells. Every helper preserves input order, so results do
//! not depend on scheduling.
//!
//! ```rust
//! use isomesh_extraction::parallel::{init_thread_pool, ThreadPoolConfig};
//!
//! let config = ThreadPoolConfig::default()
//!     .with_threads(4)
//!     .with_stack_size(16 * 1024 * 1024)
//!     .with_min_parallel_len(256);
//!
//! init_thread_pool(config).expect("Failed to initialize thread pool");
//! ```

use isomesh_core::{Error, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::{Arc, Mutex, OnceLock};

/// Dedicated thread pool, when one has been configured
static GLOBAL_THREAD_POOL: OnceLock<Arc<ThreadPool>> = OnceLock::new();
static THREAD_POOL_CONFIG: Mutex<ThreadPoolConfig> = Mutex::new(ThreadPoolConfig::new());

/// Thread pool configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of threads to use (None = automatic)
    pub num_threads: Option<usize>,
    /// Thread stack size in bytes
    pub stack_size: Option<usize>,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// Enable parallel processing (can be disabled for debugging)
    pub enabled: bool,
    /// Inputs shorter than this are processed on the calling thread
    pub min_parallel_len: usize,
}

impl ThreadPoolConfig {
    const fn new() -> Self {
        Self {
            num_threads: None,
            stack_size: None,
            thread_name_prefix: String::new(),
            enabled: true,
            min_parallel_len: 64,
        }
    }

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

    /// Set the worker thread name prefix
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Enable or disable parallel processing
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the input length below which work stays sequential
    pub fn with_min_parallel_len(mut self, len: usize) -> Self {
        self.min_parallel_len = len;
        self
    }
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "isomesh-worker".to_string(),
            ..Self::new()
        }
    }
}

/// Initialize the dedicated thread pool with custom configuration.
///
/// Without this call, parallel work runs on rayon's global pool.
pub fn init_thread_pool(config: ThreadPoolConfig) -> Result<()> {
    if GLOBAL_THREAD_POOL.get().is_some() {
        return Ok(()); // Already initialized
    }

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

    tracing::debug!(threads = pool.current_num_threads(), "initialized extraction thread pool");

    if let Ok(mut global_config) = THREAD_POOL_CONFIG.lock() {
        *global_config = config;
    }

    GLOBAL_THREAD_POOL
        .set(Arc::new(pool))
        .map_err(|_| Error::Algorithm("Thread pool already initialized".to_string()))?;

    Ok(())
}

/// Get current thread pool configuration
pub fn get_config() -> ThreadPoolConfig {
    THREAD_POOL_CONFIG
        .lock()
        .map(|config| config.clone())
        .unwrap_or_else(|_| ThreadPoolConfig::default())
}

/// Check if parallel processing is enabled
pub fn is_parallel_enabled() -> bool {
    get_config().enabled
}

fn runs_sequentially(len: usize) -> bool {
    let config = get_config();
    !config.enabled || len < config.min_parallel_len
}

/// Execute a parallel operation on the configured pool
pub fn execute_parallel<F, R>(op: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match GLOBAL_THREAD_POOL.get() {
        Some(pool) if is_parallel_enabled() => pool.install(op),
        _ => op(),
    }
}

/// Parallel map operation preserving input order
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    if runs_sequentially(data.len()) {
        return data.iter().map(f).collect();
    }

    execute_parallel(|| data.par_iter().map(f).collect())
}

/// Parallel fallible map; the first error aborts the remaining work
pub fn parallel_try_map<T, U, F>(data: &[T], f: F) -> Result<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> Result<U> + Sync + Send,
{
    if runs_sequentially(data.len()) {
        return data.iter().map(f).collect();
    }

    execute_parallel(|| data.par_iter().map(f).collect())
}

/// Map over the indices `0..len` in order, without materializing an input slice
pub fn parallel_map_range<U, F>(len: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    if runs_sequentially(len) {
        return (0..len).map(f).collect();
    }

    execute_parallel(|| (0..len).into_par_iter().map(f).collect())
}

/// Fallible [`parallel_map_range`]; the first error aborts the remaining work
pub fn parallel_try_map_range<U, F>(len: usize, f: F) -> Result<Vec<U>>
where
    U: Send,
    F: Fn(usize) -> Result<U> + Sync + Send,
{
    if runs_sequentially(len) {
        return (0..len).map(f).collect();
    }

    execute_parallel(|| (0..len).into_par_iter().map(f).collect())
}
