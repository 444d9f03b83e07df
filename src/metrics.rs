//! Metrics collection for task execution
//!
//! Provides Prometheus-compatible metrics for monitoring how many tasks ran,
//! how they ended, how long they took and how many workers are busy.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::{Result, WorkerPoolError};

lazy_static! {
    /// Counter for executed tasks, by outcome
    static ref TASK_EXECUTIONS: IntCounterVec = register_int_counter_vec!(
        "workerpool_tasks_total",
        "Total number of executed tasks",
        &["status"]
    ).expect("task counter registers once");

    /// Histogram for task duration
    static ref TASK_DURATION: Histogram = register_histogram!(
        "workerpool_task_duration_seconds",
        "Task execution duration in seconds",
        vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 600.0]
    ).expect("task histogram registers once");

    /// Gauge for workers currently alive
    static ref ACTIVE_WORKERS: IntGauge = register_int_gauge!(
        "workerpool_active_workers",
        "Number of currently running workers"
    ).expect("worker gauge registers once");

    /// Counter for completed batches
    static ref BATCHES: IntCounter = register_int_counter!(
        "workerpool_batches_total",
        "Total number of completed batches"
    ).expect("batch counter registers once");
}

/// Record one finished task
pub fn record_task(exit_code: i32, duration: Duration) {
    let status = if exit_code == 0 { "success" } else { "failure" };
    TASK_EXECUTIONS.with_label_values(&[status]).inc();
    TASK_DURATION.observe(duration.as_secs_f64());
}

/// Record a worker coming up
pub fn worker_started() {
    ACTIVE_WORKERS.inc();
}

/// Record a worker exiting
pub fn worker_finished() {
    ACTIVE_WORKERS.dec();
}

/// Record a completed batch
pub fn record_batch() {
    BATCHES.inc();
}

/// Timer for measuring task duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time elapsed since the timer started
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Export metrics in Prometheus text format
pub fn export_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| WorkerPoolError::Metrics(format!("Failed to encode metrics: {}", e)))?;

    String::from_utf8(buffer)
        .map_err(|e| WorkerPoolError::Metrics(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Write the current metrics to `path` in Prometheus text format
pub fn write_metrics(path: &Path) -> Result<()> {
    let text = export_metrics()?;
    std::fs::write(path, text).map_err(|source| WorkerPoolError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
