//! Worker loop: pull a task, run it, push its result, repeat.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, trace};

use crate::metrics::{self, Timer};
use crate::pool::{ResultHandle, SinkClosed, TaskSource};
use crate::task::{Task, TaskResult, TaskRunner, EXEC_FAILURE_CODE};

/// Lifecycle of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for the next task
    Idle,
    /// Running a task
    Executing,
    /// Task source closed and drained; the worker has exited
    Terminated,
}

/// What a worker did before it exited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    /// 1-based worker number
    pub worker_id: usize,
    /// Tasks this worker ran
    pub tasks_processed: usize,
}

/// A single pool slot
pub struct Worker {
    id: usize,
    state: WorkerState,
    source: TaskSource,
    results: ResultHandle,
    runner: Arc<dyn TaskRunner>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("runner", &"TaskRunner")
            .finish()
    }
}

impl Worker {
    /// Create a worker bound to a task source and a result sink
    pub fn new(
        id: usize,
        source: TaskSource,
        results: ResultHandle,
        runner: Arc<dyn TaskRunner>,
    ) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            source,
            results,
            runner,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Run until the task source is closed and empty.
    ///
    /// Every dequeued task yields exactly one pushed result, including when
    /// the runner panics.
    pub async fn run(mut self) -> WorkerSummary {
        debug!(worker_id = self.id, "Worker started");
        metrics::worker_started();

        let mut processed = 0;
        while let Some(task) = self.source.next().await {
            self.transition(WorkerState::Executing);
            debug!(
                worker_id = self.id,
                task_id = %task.identifier,
                command = %task.display_command(),
                "Starting task"
            );

            let timer = Timer::start();
            let result = self.execute(&task).await;
            let elapsed = timer.elapsed();
            metrics::record_task(result.exit_code, elapsed);

            debug!(
                worker_id = self.id,
                task_id = %task.identifier,
                exit_code = result.exit_code,
                duration_ms = elapsed.as_millis() as u64,
                "Finished task"
            );

            if let Err(SinkClosed(lost)) = self.results.push(result).await {
                error!(
                    worker_id = self.id,
                    task_id = %lost.identifier,
                    "Result sink closed before result could be delivered"
                );
            }

            processed += 1;
            self.transition(WorkerState::Idle);
        }

        self.transition(WorkerState::Terminated);
        metrics::worker_finished();
        debug!(worker_id = self.id, tasks_processed = processed, "Worker finished");

        WorkerSummary {
            worker_id: self.id,
            tasks_processed: processed,
        }
    }

    async fn execute(&self, task: &Task) -> TaskResult {
        match AssertUnwindSafe(self.runner.run(task)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                error!(worker_id = self.id, task_id = %task.identifier, "Task runner panicked");
                TaskResult::failure(
                    &task.identifier,
                    EXEC_FAILURE_CODE,
                    format!("Task runner panicked while running {}", task.identifier),
                )
            }
        }
    }

    fn transition(&mut self, next: WorkerState) {
        trace!(worker_id = self.id, from = ?self.state, to = ?next, "Worker state change");
        self.state = next;
    }
}
