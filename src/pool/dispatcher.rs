//! Publishes a batch onto the task queue once, then closes it.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::pool::{QueueClosed, TaskPublisher};
use crate::task::Task;

/// Feeds a fixed task list to the workers
#[derive(Debug)]
pub struct Dispatcher {
    tasks: Vec<Arc<Task>>,
}

impl Dispatcher {
    /// Create a dispatcher for an ordered task list
    pub fn new(tasks: Vec<Arc<Task>>) -> Self {
        Self { tasks }
    }

    /// Number of tasks this dispatcher will publish
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether there is nothing to publish
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Publish every task in order, then close the queue.
    ///
    /// Returns the number of tasks actually enqueued. The close happens after
    /// the last enqueue, so workers see every task before they see the end.
    pub async fn dispatch(self, publisher: TaskPublisher) -> usize {
        let total = self.tasks.len();
        let mut published = 0;

        for task in self.tasks {
            if let Err(QueueClosed(task)) = publisher.publish(task).await {
                warn!(
                    task_id = %task.identifier,
                    published,
                    total,
                    "Task queue closed before dispatch finished"
                );
                break;
            }
            published += 1;
        }

        publisher.close();
        debug!(published, "Dispatched tasks");
        published
    }

    /// Run [`Dispatcher::dispatch`] on its own tokio task
    pub fn spawn(self, publisher: TaskPublisher) -> JoinHandle<usize> {
        tokio::spawn(self.dispatch(publisher))
    }
}
