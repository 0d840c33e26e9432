//! Queued work handoff.
//!
//! A [`Job`] is a serializable unit of work. Producers wrap it in a
//! [`JobEnvelope`] and push it onto a [`JobQueue`]; they never wait for it to
//! run. Execution, retry and backoff belong to whatever consumes the queue
//! (see the `roster-worker` crate).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The consumer side of the queue has shut down.
    #[error("Job queue is closed")]
    Closed,

    /// The job could not be encoded into, or decoded from, an envelope.
    #[error("Job payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// The envelope holds a different job type than the one requested.
    #[error("Expected job {expected}, found {found}")]
    WrongJob {
        expected: &'static str,
        found: String,
    },
}

// ---------------------------------------------------------------------------
// Job / JobEnvelope
// ---------------------------------------------------------------------------

/// A unit of work that can be queued.
pub trait Job: Serialize + DeserializeOwned + Send + 'static {
    /// Name the consumer routes on, e.g. `"welcome_email"`.
    const NAME: &'static str;
}

/// A queued job together with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub id: Uuid,
    /// The [`Job::NAME`] of the payload.
    pub job: String,
    pub payload: serde_json::Value,
    /// Completed execution attempts; zero when first queued.
    pub attempts: u32,
    pub queued_at: DateTime<Utc>,
}

impl JobEnvelope {
    /// Wrap a job for queueing.
    pub fn new<J: Job>(job: &J) -> Result<Self, QueueError> {
        Ok(Self {
            id: Uuid::new_v4(),
            job: J::NAME.to_string(),
            payload: serde_json::to_value(job)?,
            attempts: 0,
            queued_at: Utc::now(),
        })
    }

    /// Recover the typed job, checking that the envelope holds a `J`.
    pub fn decode<J: Job>(&self) -> Result<J, QueueError> {
        if self.job != J::NAME {
            return Err(QueueError::WrongJob {
                expected: J::NAME,
                found: self.job.clone(),
            });
        }
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

// ---------------------------------------------------------------------------
// JobQueue
// ---------------------------------------------------------------------------

/// Destination for queued work.
///
/// `push` must not block: it hands the envelope off and returns.
pub trait JobQueue: Send + Sync {
    fn push(&self, envelope: JobEnvelope) -> Result<(), QueueError>;
}

/// Wrap `job` and push it onto `queue`, returning the envelope id.
pub fn dispatch<J: Job>(queue: &dyn JobQueue, job: &J) -> Result<Uuid, QueueError> {
    let envelope = JobEnvelope::new(job)?;
    let id = envelope.id;
    queue.push(envelope)?;
    tracing::debug!(job = J::NAME, job_id = %id, "Job queued");
    Ok(id)
}

/// Receiving half of a [`ChannelQueue`].
pub type JobReceiver = mpsc::UnboundedReceiver<JobEnvelope>;

/// In-process queue backed by an unbounded `tokio::sync::mpsc` channel.
///
/// Cloning yields another producer onto the same queue. The queue closes
/// once the [`JobReceiver`] is dropped.
#[derive(Clone)]
pub struct ChannelQueue {
    sender: mpsc::UnboundedSender<JobEnvelope>,
}

impl ChannelQueue {
    /// Create a queue and the receiver its consumer reads from.
    pub fn new() -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl JobQueue for ChannelQueue {
    fn push(&self, envelope: JobEnvelope) -> Result<(), QueueError> {
        self.sender.send(envelope).map_err(|_| QueueError::Closed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Ping {
        target: String,
    }
    impl Job for Ping {
        const NAME: &'static str = "ping";
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Other;
    impl Job for Other {
        const NAME: &'static str = "other";
    }

    #[tokio::test]
    async fn dispatched_job_reaches_receiver() {
        let (queue, mut rx) = ChannelQueue::new();
        let id = dispatch(
            &queue,
            &Ping {
                target: "a".to_string(),
            },
        )
        .unwrap();

        let envelope = rx.recv().await.expect("envelope should be queued");
        assert_eq!(envelope.id, id);
        assert_eq!(envelope.job, "ping");
        assert_eq!(envelope.attempts, 0);
        assert_eq!(
            envelope.decode::<Ping>().unwrap(),
            Ping {
                target: "a".to_string()
            }
        );
    }

    #[test]
    fn decode_rejects_other_job_types() {
        let envelope = JobEnvelope::new(&Ping {
            target: "a".to_string(),
        })
        .unwrap();
        assert_matches!(
            envelope.decode::<Other>(),
            Err(QueueError::WrongJob { expected: "other", found }) if found == "ping"
        );
    }

    #[test]
    fn push_after_receiver_dropped_is_closed() {
        let (queue, rx) = ChannelQueue::new();
        drop(rx);
        let result = dispatch(
            &queue,
            &Ping {
                target: "a".to_string(),
            },
        );
        assert_matches!(result, Err(QueueError::Closed));
    }
}
