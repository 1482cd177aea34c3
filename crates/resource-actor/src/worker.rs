//! # Bounded Work Queue
//!
//! A single worker task draining a bounded channel of jobs. Unlike a `ResourceActor`, the
//! worker keeps no state of its own and never replies; producers either get a slot in the
//! queue or are told the queue is full.
//!
//! Backpressure is explicit:
//! - [`WorkQueue::try_submit`] rejects immediately with [`QueueError::Full`].
//! - [`WorkQueue::submit`] waits for capacity.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Processes one job at a time. Errors are the handler's business; the loop only logs.
#[async_trait]
pub trait JobHandler<J: Send + 'static>: Send + Sync + 'static {
    async fn handle(&self, job: J);
}

/// Why a job was not accepted.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Work queue is full")]
    Full,
    #[error("Work queue is closed")]
    Closed,
}

/// Producer side of the queue. Cheap to clone; the worker stops once every clone is dropped
/// and the backlog has been drained.
///
/// Jobs never appear in the loop's logs; handlers log what is safe to log.
pub struct WorkQueue<J> {
    name: &'static str,
    sender: mpsc::Sender<J>,
}

impl<J> Clone for WorkQueue<J> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            sender: self.sender.clone(),
        }
    }
}

impl<J: Send + 'static> WorkQueue<J> {
    /// Spawns the worker loop and returns the producer handle plus the worker's join handle.
    pub fn spawn<H>(name: &'static str, capacity: usize, handler: H) -> (Self, JoinHandle<()>)
    where
        H: JobHandler<J>,
    {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_worker(name, receiver, handler));
        (Self { name, sender }, handle)
    }

    /// Enqueue without waiting.
    pub fn try_submit(&self, job: J) -> Result<(), QueueError> {
        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                warn!(worker = self.name, "Rejecting job, queue full");
                QueueError::Full
            }
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    /// Enqueue, waiting for capacity if the queue is full.
    pub async fn submit(&self, job: J) -> Result<(), QueueError> {
        self.sender.send(job).await.map_err(|_| QueueError::Closed)
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.sender.capacity()
    }
}

async fn run_worker<J, H>(name: &'static str, mut receiver: mpsc::Receiver<J>, handler: H)
where
    J: Send + 'static,
    H: JobHandler<J>,
{
    info!(worker = name, "Worker started");
    let mut processed: u64 = 0;
    while let Some(job) = receiver.recv().await {
        processed += 1;
        debug!(worker = name, job = processed, "Job");
        handler.handle(job).await;
    }
    info!(worker = name, processed, "Worker stopped");
}
