//! Deferred notification delivery, decoupled from the request path.
//!
//! Accepting or rejecting a connection request must never wait on
//! notification persistence or live push. Domain code enqueues a [`Job`]
//! after its transaction commits; a dedicated [`Worker`] task consumes the
//! queue, persists the notification and publishes it to the recipient's
//! live sessions.
//!
//! Delivery is at-least-once within the process: transient store failures
//! are retried with exponential backoff up to a configured bound, then the
//! job is dropped with a log line carrying enough context for manual
//! replay. A missing recipient is terminal and never retried.

pub mod worker;

pub use worker::{DeliveryError, Worker};

use entity::Id;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A unit of deferred work: create and push one notification describing
/// what `actor` did to `recipient`'s connection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub recipient: String,
    pub actor: Option<String>,
    /// Free-form action name; "accepted" and "rejected" get dedicated verb
    /// phrasing, anything else is used literally.
    pub action: String,
    /// The originating connection request, for log correlation and replay.
    pub request_id: Id,
}

/// Creates the queue pair: a clonable sending handle for producers and the
/// receiving end the worker consumes.
pub fn channel() -> (JobQueue, UnboundedReceiver<Job>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (JobQueue { tx }, rx)
}

/// Producer handle. Enqueueing is fire-and-forget and never blocks.
#[derive(Clone)]
pub struct JobQueue {
    tx: UnboundedSender<Job>,
}

impl JobQueue {
    pub fn enqueue(&self, job: Job) -> Result<(), EnqueueError> {
        self.tx.send(job).map_err(|err| EnqueueError(err.0))
    }
}

/// The queue's receiving side is gone; carries the job back for logging.
#[derive(Debug)]
pub struct EnqueueError(pub Job);

impl fmt::Display for EnqueueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "dispatch queue closed; dropping job for recipient {} (request {})",
            self.0.recipient, self.0.request_id
        )
    }
}

impl StdError for EnqueueError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job {
            recipient: "SPC-20240915-a1b2c3".to_owned(),
            actor: Some("SPC-20240915-d4e5f6".to_owned()),
            action: "accepted".to_owned(),
            request_id: Id::new_v4(),
        }
    }

    #[tokio::test]
    async fn enqueued_jobs_arrive_in_order() {
        let (queue, mut rx) = channel();

        let first = job();
        let second = job();
        queue.enqueue(first.clone()).unwrap();
        queue.enqueue(second.clone()).unwrap();

        assert_eq!(rx.recv().await.unwrap(), first);
        assert_eq!(rx.recv().await.unwrap(), second);
    }

    #[tokio::test]
    async fn enqueue_fails_once_the_receiver_is_dropped() {
        let (queue, rx) = channel();
        drop(rx);

        let dropped = job();
        let err = queue.enqueue(dropped.clone()).unwrap_err();

        assert_eq!(err.0, dropped);
    }
}
