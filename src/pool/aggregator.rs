//! Collects results from the sink in arrival order.

use tracing::trace;

use crate::pool::ResultDrain;
use crate::task::TaskResult;

/// Accumulates results until the sink is closed
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Vec<TaskResult>,
}

impl ResultAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregator expecting roughly `capacity` results
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
        }
    }

    /// Drain the sink until it is closed and empty.
    ///
    /// Results keep the order they arrived in, which is task completion
    /// order rather than submission order.
    pub async fn collect(mut self, mut drain: ResultDrain) -> Vec<TaskResult> {
        while let Some(result) = drain.recv().await {
            trace!(task_id = %result.identifier, received = self.results.len() + 1, "Result received");
            self.results.push(result);
        }
        self.results
    }
}
