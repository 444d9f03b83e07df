//! Worker Pool Implementation
//!
//! Runs a batch of tasks with:
//! - A bounded number of workers sharing one FIFO task queue
//! - A dispatcher publishing the batch concurrently with worker startup
//! - A completion watcher that closes the result sink once every worker exits
//! - Result aggregation in completion order
//!
//! The watcher and the aggregator must run at the same time: the aggregator
//! only stops once the sink is closed, and the sink only closes once the
//! watcher has joined every worker.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::metrics;
use crate::pool::{
    result_channel, task_queue, BatchReport, BatchStats, Dispatcher, PoolConfig, ResultAggregator,
    ResultSink, Worker, WorkerSummary,
};
use crate::task::{ProcessRunner, Task, TaskResult, TaskRunner};

/// Bounded pool that runs every task of a batch exactly once
pub struct WorkerPool {
    config: PoolConfig,
    runner: Arc<dyn TaskRunner>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("runner", &"TaskRunner")
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool that runs tasks as child processes
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            runner: Arc::new(ProcessRunner::new()),
        }
    }

    /// Replace the task runner
    pub fn with_runner(mut self, runner: Arc<dyn TaskRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run every task and return the results in completion order
    pub async fn run(&self, tasks: Vec<Task>) -> Vec<TaskResult> {
        self.execute(tasks).await.results
    }

    /// Run every task and return results together with batch statistics
    #[instrument(skip(self, tasks), fields(task_count = tasks.len()))]
    pub async fn execute(&self, tasks: Vec<Task>) -> BatchReport {
        let batch_start = Instant::now();
        let total_tasks = tasks.len();

        info!(max_threads = self.config.max_threads, "max_threads set");
        info!(total_tasks, "Tasks to process");

        if tasks.is_empty() {
            return self.finish(0, 0, Vec::new(), Vec::new(), batch_start);
        }

        let worker_count = self.config.effective_workers(total_tasks);
        if worker_count < self.config.max_threads.max(1) {
            debug!(worker_count, "Fewer tasks than max_threads, shrinking pool");
        }

        let (publisher, source) = task_queue(total_tasks);
        let (sink, drain) = result_channel(worker_count);

        let mut workers = JoinSet::new();
        for worker_id in 1..=worker_count {
            let worker = Worker::new(worker_id, source.clone(), sink.handle(), Arc::clone(&self.runner));
            workers.spawn(worker.run());
        }
        drop(source);

        let dispatcher = Dispatcher::new(tasks.into_iter().map(Arc::new).collect()).spawn(publisher);
        let watcher = tokio::spawn(watch_workers(workers, sink));

        let results = ResultAggregator::with_capacity(total_tasks).collect(drain).await;

        match dispatcher.await {
            Ok(published) if published != total_tasks => {
                warn!(published, total_tasks, "Not every task was dispatched");
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Dispatcher task failed"),
        }

        let summaries = match watcher.await {
            Ok(summaries) => summaries,
            Err(e) => {
                error!(error = %e, "Completion watcher failed");
                Vec::new()
            }
        };

        self.finish(total_tasks, worker_count, results, summaries, batch_start)
    }

    /// Record and log the batch summary, then assemble the report
    fn finish(
        &self,
        total_tasks: usize,
        worker_count: usize,
        results: Vec<TaskResult>,
        workers: Vec<WorkerSummary>,
        batch_start: Instant,
    ) -> BatchReport {
        let stats = BatchStats::from_results(total_tasks, worker_count, &results, batch_start.elapsed());
        metrics::record_batch();

        if results.len() != total_tasks {
            warn!(
                expected = total_tasks,
                received = results.len(),
                "Result count does not match task count"
            );
        }

        info!(
            total_tasks = stats.total_tasks,
            workers = stats.worker_count,
            succeeded = stats.succeeded,
            failed = stats.failed,
            batch_duration_ms = stats.duration.as_millis() as u64,
            "Batch execution completed"
        );

        BatchReport {
            results,
            stats,
            workers,
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// Join every worker, then close the result sink.
///
/// Owning the sink here is what makes this the only place it can close.
async fn watch_workers(
    mut workers: JoinSet<WorkerSummary>,
    sink: ResultSink,
) -> Vec<WorkerSummary> {
    let mut summaries = Vec::with_capacity(workers.len());

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(summary) => summaries.push(summary),
            Err(e) => error!(error = %e, "Worker task failed"),
        }
    }

    debug!(workers = summaries.len(), "All workers finished, closing result sink");
    sink.close();
    summaries
}
