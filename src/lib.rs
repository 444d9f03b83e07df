//! # workerpool
//!
//! Run a batch of independent external commands with bounded parallelism and
//! collect one structured result per command.
//!
//! ## Overview
//!
//! A batch is a list of [`task::Task`] records. The [`pool::WorkerPool`]
//! publishes them onto a shared queue, starts at most `max_threads` workers
//! that pull tasks and run each one as a child process, and aggregates the
//! resulting [`task::TaskResult`] records in completion order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use workerpool::pool::{PoolConfig, WorkerPool};
//! use workerpool::task::Task;
//!
//! # async fn example() {
//! let pool = WorkerPool::new(PoolConfig::default().with_max_threads(4));
//! let results = pool
//!     .run(vec![
//!         Task::new("greet", "echo", ["hello"]),
//!         Task::new("fail", "false", Vec::<String>::new()),
//!     ])
//!     .await;
//!
//! for result in results {
//!     println!("{}: {}", result.identifier, result.exit_code);
//! }
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`task`]: task and result records, and the process executor
//! - [`pool`]: worker pool, dispatcher, result aggregation
//! - [`io`]: loading task lists and writing result lists as JSON
//! - [`metrics`]: Prometheus collectors for executed tasks
//! - [`logging`]: tracing subscriber setup for the binary

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::path::PathBuf;
use thiserror::Error;

/// Result type for workerpool operations
pub type Result<T> = std::result::Result<T, WorkerPoolError>;

/// Main error type for workerpool operations.
///
/// Per-task failures are never represented here; they are captured in the
/// task's own [`task::TaskResult`]. Only input and output stage failures
/// surface as errors.
#[derive(Error, Debug)]
pub enum WorkerPoolError {
    /// Neither an inline task list nor an input file was provided
    #[error("You must provide a JSON list of tasks in the first argument or define a filepath using --infile")]
    MissingInput,

    /// The task input file could not be read
    #[error("Unable to read infile {path}: {source}")]
    InputRead {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The task definitions are not a valid JSON task list
    #[error("Unable to parse task definitions: {0}")]
    InputParse(#[source] serde_json::Error),

    /// The result list could not be encoded
    #[error("Unable to serialize results: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The results could not be written to their destination
    #[error("Unable to write results to {path}: {source}")]
    OutputWrite {
        /// Destination path, `-` for standard output
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Metrics could not be gathered or encoded
    #[error("Metrics error: {0}")]
    Metrics(String),
}

/// Task and result records, and the process executor
pub mod task;

/// Bounded worker pool and its coordination pieces
pub mod pool;

/// JSON input and output of task and result lists
pub mod io;

/// Prometheus metrics for task execution
pub mod metrics;

/// Tracing subscriber setup
pub mod logging;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_message() {
        let err = WorkerPoolError::MissingInput;
        assert!(err.to_string().contains("--infile"));
    }

    #[test]
    fn test_input_read_mentions_path() {
        let err = WorkerPoolError::InputRead {
            path: PathBuf::from("/nope/tasks.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/nope/tasks.json"));
    }
}
