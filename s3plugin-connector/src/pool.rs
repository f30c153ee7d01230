//! Process-wide worker pool for network I/O
//!
//! Remote calls can block for a full network round-trip, so they never run on
//! the caller's executor. Every entry point spawns its work onto one shared
//! multi-threaded runtime that lives for the rest of the process.

use once_cell::sync::OnceCell;
use s3plugin_core::PluginError;
use std::future::Future;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info};

/// Worker threads used when the pool is not configured explicitly
pub const DEFAULT_WORKER_THREADS: usize = 32;

static POOL: OnceCell<Runtime> = OnceCell::new();

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("I/O pool is already running")]
    AlreadyInitialized,

    #[error("Failed to start I/O pool: {0}")]
    Start(#[from] std::io::Error),
}

/// Worker pool settings
#[derive(Debug, Clone)]
pub struct IoPoolConfig {
    pub worker_threads: usize,
    pub thread_name: String,
}

impl Default for IoPoolConfig {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            thread_name: "s3plugin-io".to_string(),
        }
    }
}

fn build(config: &IoPoolConfig) -> std::io::Result<Runtime> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(config.worker_threads.max(1))
        .thread_name(config.thread_name.clone())
        .enable_all()
        .build()?;

    info!(
        worker_threads = config.worker_threads.max(1),
        thread_name = %config.thread_name,
        "I/O pool started"
    );
    Ok(runtime)
}

/// Start the pool with explicit settings.
///
/// Call once at process start, before any plugin entry point runs.
pub fn init(config: &IoPoolConfig) -> Result<(), PoolError> {
    let mut initialized_here = false;
    POOL.get_or_try_init(|| {
        initialized_here = true;
        build(config)
    })?;

    if initialized_here {
        Ok(())
    } else {
        Err(PoolError::AlreadyInitialized)
    }
}

fn runtime() -> Result<&'static Runtime, PoolError> {
    Ok(POOL.get_or_try_init(|| build(&IoPoolConfig::default()))?)
}

/// Run `future` on the pool and wait for its output without blocking the
/// caller's thread.
///
/// If the caller stops waiting, the task still runs to completion on the pool.
pub async fn run<F, T>(future: F) -> Result<T, PluginError>
where
    F: Future<Output = Result<T, PluginError>> + Send + 'static,
    T: Send + 'static,
{
    let runtime = runtime().map_err(|e| PluginError::internal(e.to_string()))?;

    match runtime.spawn(future).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "I/O task did not complete");
            Err(PluginError::internal(format!(
                "The storage operation was interrupted unexpectedly: {e}"
            )))
        }
    }
}
