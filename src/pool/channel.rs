//! Queues connecting the dispatcher, the workers and the aggregator.
//!
//! Each queue has exactly one closing capability. The task queue is closed
//! by consuming its [`TaskPublisher`]; the result sink is closed by dropping
//! its [`ResultSink`]. Workers only ever hold a [`TaskSource`] and a
//! [`ResultHandle`], neither of which can close anything or keep the sink
//! open.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

use crate::task::{Task, TaskResult};

/// The task queue was closed on the consuming side
#[derive(Debug, Error)]
#[error("task queue has no consumers left")]
pub struct QueueClosed(pub Arc<Task>);

/// The result sink was already closed
#[derive(Debug, Error)]
#[error("result sink is closed")]
pub struct SinkClosed(pub TaskResult);

/// Create a task queue that holds `capacity` pending tasks without blocking
pub fn task_queue(capacity: usize) -> (TaskPublisher, TaskSource) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        TaskPublisher { sender },
        TaskSource {
            receiver: Arc::new(Mutex::new(receiver)),
        },
    )
}

/// Create a result channel buffering up to `capacity` undelivered results
pub fn result_channel(capacity: usize) -> (ResultSink, ResultDrain) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ResultSink { sender }, ResultDrain { receiver })
}

/// Write side of the task queue, held by the dispatcher only
#[derive(Debug)]
pub struct TaskPublisher {
    sender: mpsc::Sender<Arc<Task>>,
}

impl TaskPublisher {
    /// Enqueue one task
    pub async fn publish(&self, task: Arc<Task>) -> Result<(), QueueClosed> {
        self.sender.send(task).await.map_err(|e| QueueClosed(e.0))
    }

    /// Signal that no more tasks will arrive
    pub fn close(self) {
        drop(self.sender);
    }
}

/// Shared read side of the task queue.
///
/// Clones pull from the same queue; every task is handed to exactly one
/// caller of [`TaskSource::next`].
#[derive(Debug, Clone)]
pub struct TaskSource {
    receiver: Arc<Mutex<mpsc::Receiver<Arc<Task>>>>,
}

impl TaskSource {
    /// Next pending task, or `None` once the queue is closed and drained
    pub async fn next(&self) -> Option<Arc<Task>> {
        self.receiver.lock().await.recv().await
    }
}

/// Owning side of the result channel.
///
/// The sink stays open exactly as long as this value lives.
#[derive(Debug)]
pub struct ResultSink {
    sender: mpsc::Sender<TaskResult>,
}

impl ResultSink {
    /// A non-owning handle workers use to push results
    pub fn handle(&self) -> ResultHandle {
        ResultHandle {
            sender: self.sender.downgrade(),
        }
    }

    /// Close the sink; the drain ends once buffered results are consumed
    pub fn close(self) {
        drop(self.sender);
    }
}

/// Push-only handle to the result sink
#[derive(Debug, Clone)]
pub struct ResultHandle {
    sender: mpsc::WeakSender<TaskResult>,
}

impl ResultHandle {
    /// Deliver a result, waiting for buffer space if needed
    pub async fn push(&self, result: TaskResult) -> Result<(), SinkClosed> {
        let Some(sender) = self.sender.upgrade() else {
            return Err(SinkClosed(result));
        };
        sender.send(result).await.map_err(|e| SinkClosed(e.0))
    }
}

/// Read side of the result channel, consumed by the aggregator
#[derive(Debug)]
pub struct ResultDrain {
    receiver: mpsc::Receiver<TaskResult>,
}

impl ResultDrain {
    /// Next result, or `None` once the sink is closed and drained
    pub async fn recv(&mut self) -> Option<TaskResult> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_queue_fifo_then_closed() {
        let (publisher, source) = task_queue(3);
        for id in ["a", "b", "c"] {
            publisher
                .publish(Arc::new(Task::new(id, "true", Vec::<String>::new())))
                .await
                .unwrap();
        }
        publisher.close();

        let mut seen = Vec::new();
        while let Some(task) = source.next().await {
            seen.push(task.identifier.clone());
        }
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert!(source.next().await.is_none());
    }

    #[tokio::test]
    async fn test_handle_does_not_keep_sink_open() {
        let (sink, mut drain) = result_channel(4);
        let handle = sink.handle();
        handle.push(TaskResult::completed("a", 0, "")).await.unwrap();
        sink.close();

        assert_eq!(drain.recv().await.map(|r| r.identifier), Some("a".to_string()));
        assert!(drain.recv().await.is_none());
        assert!(handle.push(TaskResult::completed("b", 0, "")).await.is_err());
    }
}
