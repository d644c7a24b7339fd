//! Bounded worker pool for cracking many files
//!
//! One task per file, no state shared between tasks. The pool is owned by the
//! caller rather than installed globally, so independent batches can run with
//! different sizes.

use crate::error::{IoError, Result};
use crate::{crack_file, CrackOptions, CrackSummary};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of worker threads (None = available cores minus the reserve)
    pub num_threads: Option<usize>,
    /// Cores left free for the rest of the system when sizing automatically
    pub reserve_threads: usize,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// Stop dispatching new files after the first failure
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            reserve_threads: 1,
            thread_name_prefix: "objcrack-worker".to_string(),
            fail_fast: false,
        }
    }
}

impl BatchConfig {
    /// Set number of threads
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Set the number of cores kept free
    pub fn with_reserve_threads(mut self, reserve: usize) -> Self {
        self.reserve_threads = reserve;
        self
    }

    /// Enable or disable fail-fast dispatch
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Effective pool size, never below one
    pub fn pool_size(&self) -> usize {
        self.num_threads
            .unwrap_or_else(|| num_cpus::get().saturating_sub(self.reserve_threads))
            .max(1)
    }
}

/// Shared flag that stops a batch from starting new files
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A rayon pool sized from a [`BatchConfig`]
pub struct WorkerPool {
    pool: ThreadPool,
    config: BatchConfig,
}

impl WorkerPool {
    pub fn new(config: BatchConfig) -> Result<Self> {
        let prefix = config.thread_name_prefix.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.pool_size())
            .thread_name(move |index| format!("{}-{}", prefix, index))
            .build()
            .map_err(|e| IoError::ThreadPool(format!("Failed to create thread pool: {}", e)))?;
        Ok(Self { pool, config })
    }

    pub fn size(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run `task` once per path; `None` marks files skipped after cancellation
    pub fn map_files<T, F>(&self, paths: &[PathBuf], cancel: &CancellationToken, task: F) -> Vec<Option<T>>
    where
        T: Send,
        F: Fn(&Path) -> T + Sync + Send,
    {
        let total = paths.len();
        let started = AtomicUsize::new(0);

        self.pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let n = started.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::info!("{} {} of {}", path.display(), n, total);
                    Some(task(path))
                })
                .collect()
        })
    }
}

/// A file that could not be cracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Result of cracking a set of files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub succeeded: Vec<CrackSummary>,
    pub failed: Vec<FailedFile>,
    /// Files never started because the batch was cancelled
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }

    /// True when every file was cracked
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Crack every file in `paths` on a worker pool
///
/// Per-file failures are collected into the report; only failing to build the
/// pool is returned as an error.
pub fn run_batch(
    paths: &[PathBuf],
    options: &CrackOptions,
    config: &BatchConfig,
    cancel: &CancellationToken,
) -> Result<BatchReport> {
    let pool = WorkerPool::new(config.clone())?;
    tracing::info!(files = paths.len(), threads = pool.size(), "starting batch");

    let fail_fast = config.fail_fast;
    let results = pool.map_files(paths, cancel, |path| {
        let result = crack_file(path, options);
        if let Err(e) = &result {
            tracing::error!("{}", e);
            if fail_fast {
                cancel.cancel();
            }
        }
        result
    });

    let mut report = BatchReport::default();
    for (path, result) in paths.iter().zip(results) {
        match result {
            Some(Ok(summary)) => report.succeeded.push(summary),
            Some(Err(e)) => report.failed.push(FailedFile {
                path: path.clone(),
                error: e.to_string(),
            }),
            None => report.skipped.push(path.clone()),
        }
    }

    tracing::info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GOOD: &str = "# o A\ng {name}_a\nv 0 0 0\n#\n# o B\ng {name}_b\nv 1 1 1\nf 2 2 2\n";

    fn write_library(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(format!("{}.obj", name));
                let text = if name.starts_with("bad") {
                    "v 0 0 0\n".to_string()
                } else {
                    GOOD.replace("{name}", name)
                };
                fs::write(&path, text).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_pool_size() {
        assert_eq!(BatchConfig::default().with_threads(3).pool_size(), 3);
        assert_eq!(BatchConfig::default().with_threads(0).pool_size(), 1);
        let reserve_all = BatchConfig::default().with_reserve_threads(usize::MAX);
        assert_eq!(reserve_all.pool_size(), 1);
    }

    #[test]
    fn test_run_batch_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_library(dir.path(), &["alpha", "bad_one", "gamma"]);

        let config = BatchConfig::default().with_threads(2);
        let report = run_batch(&paths, &CrackOptions::default(), &config, &CancellationToken::new()).unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, paths[1]);
        assert!(report.failed[0].error.contains("No object markers"));
        assert!(!report.is_success());
        assert!(dir.path().join("alpha_b.obj").exists());
        assert!(dir.path().join("gamma_a.obj").exists());
    }

    #[test]
    fn test_cancelled_batch_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_library(dir.path(), &["alpha", "beta"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = run_batch(&paths, &CrackOptions::default(), &BatchConfig::default(), &cancel).unwrap();
        assert_eq!(report.skipped, paths);
        assert!(!dir.path().join("alpha_a.obj").exists());
    }

    #[test]
    fn test_fail_fast_skips_remaining_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_library(dir.path(), &["bad_first", "beta", "gamma"]);

        let config = BatchConfig::default().with_threads(1).with_fail_fast(true);
        let cancel = CancellationToken::new();
        let report = run_batch(&paths, &CrackOptions::default(), &config, &cancel).unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.skipped.len(), 2);
        assert!(cancel.is_cancelled());
    }
}
