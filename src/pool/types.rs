//! Pool configuration and batch reporting types.

use std::time::Duration;

use crate::pool::WorkerSummary;
use crate::task::TaskResult;

/// Default worker cap when none is configured
pub const DEFAULT_MAX_THREADS: usize = 2;

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Upper bound on concurrently running workers
    pub max_threads: usize,
}

impl PoolConfig {
    /// Create a configuration with the given worker cap
    pub fn new(max_threads: usize) -> Self {
        Self { max_threads }
    }

    /// Set the worker cap
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Number of workers to start for `task_count` tasks.
    ///
    /// Never more workers than tasks, and never zero workers for a non-empty
    /// batch: a cap of 0 is treated as 1.
    pub fn effective_workers(&self, task_count: usize) -> usize {
        self.max_threads.max(1).min(task_count)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_threads: DEFAULT_MAX_THREADS,
        }
    }
}

/// Batch execution statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Tasks submitted
    pub total_tasks: usize,
    /// Workers started
    pub worker_count: usize,
    /// Results with exit code 0
    pub succeeded: usize,
    /// Results with a non-zero exit code
    pub failed: usize,
    /// Wall time for the whole batch
    pub duration: Duration,
}

impl BatchStats {
    pub(crate) fn from_results(
        total_tasks: usize,
        worker_count: usize,
        results: &[TaskResult],
        duration: Duration,
    ) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            total_tasks,
            worker_count,
            succeeded,
            failed: results.len() - succeeded,
            duration,
        }
    }
}

/// Everything a finished batch produced
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Results in completion order
    pub results: Vec<TaskResult>,
    /// Aggregate counters for the batch
    pub stats: BatchStats,
    /// One summary per worker that exited cleanly
    pub workers: Vec<WorkerSummary>,
}
