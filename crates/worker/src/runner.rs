//! Queue consumer.
//!
//! [`JobRunner`] reads [`JobEnvelope`]s from the in-process queue, routes
//! each by job name and retries transient failures with the configured
//! backoff. Jobs run one at a time in the order they were queued.

use std::sync::Arc;

use roster_events::queue::{Job, JobReceiver, QueueError};
use roster_events::{JobEnvelope, WelcomeEmailJob};
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;
use crate::mailer::{MailError, Mailer};

// ---------------------------------------------------------------------------
// Error / outcome
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// No handler is registered for the envelope's job name.
    #[error("Unknown job: {0}")]
    UnknownJob(String),

    /// The payload does not decode into the named job.
    #[error(transparent)]
    Payload(#[from] QueueError),

    #[error(transparent)]
    Mail(#[from] MailError),
}

impl JobError {
    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Mail(e) => e.is_transient(),
            Self::UnknownJob(_) | Self::Payload(_) => false,
        }
    }
}

/// Final state of a processed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { attempts: u32 },
    /// Failed permanently; retrying would not help.
    Discarded { attempts: u32 },
    /// Still failing after the last allowed attempt.
    Exhausted { attempts: u32 },
}

// ---------------------------------------------------------------------------
// JobRunner
// ---------------------------------------------------------------------------

/// Executes queued jobs.
pub struct JobRunner {
    mailer: Arc<dyn Mailer>,
    config: WorkerConfig,
}

impl JobRunner {
    pub fn new(mailer: Arc<dyn Mailer>, config: WorkerConfig) -> Self {
        Self { mailer, config }
    }

    /// Run the consume loop.
    ///
    /// Exits when the queue is closed (every producer dropped) or `cancel`
    /// is triggered. A job already executing is finished first.
    pub async fn run(self, mut receiver: JobReceiver, cancel: CancellationToken) {
        tracing::info!(
            max_attempts = self.config.max_attempts,
            "Job runner started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job runner cancelled");
                    break;
                }
                next = receiver.recv() => match next {
                    Some(envelope) => {
                        self.process(envelope).await;
                    }
                    None => {
                        tracing::info!("Job queue closed, runner shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Execute one envelope, retrying transient failures.
    pub async fn process(&self, mut envelope: JobEnvelope) -> JobOutcome {
        let max_attempts = self.config.max_attempts.max(1);

        loop {
            envelope.attempts += 1;
            let attempts = envelope.attempts;

            let err = match self.execute(&envelope).await {
                Ok(()) => {
                    tracing::info!(
                        job = %envelope.job,
                        job_id = %envelope.id,
                        attempts,
                        "Job completed"
                    );
                    return JobOutcome::Completed { attempts };
                }
                Err(e) => e,
            };

            if !err.is_transient() {
                tracing::error!(
                    job = %envelope.job,
                    job_id = %envelope.id,
                    error = %err,
                    "Job failed permanently, discarding"
                );
                return JobOutcome::Discarded { attempts };
            }

            if attempts >= max_attempts {
                tracing::error!(
                    job = %envelope.job,
                    job_id = %envelope.id,
                    attempts,
                    error = %err,
                    "Job failed after all retries"
                );
                return JobOutcome::Exhausted { attempts };
            }

            let delay = self.config.delay_after(attempts);
            tracing::warn!(
                job = %envelope.job,
                job_id = %envelope.id,
                attempts,
                retry_in_ms = delay.as_millis() as u64,
                error = %err,
                "Job attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Route an envelope to its handler.
    async fn execute(&self, envelope: &JobEnvelope) -> Result<(), JobError> {
        match envelope.job.as_str() {
            name if name == WelcomeEmailJob::NAME => {
                let job = envelope.decode::<WelcomeEmailJob>()?;
                self.mailer.send_welcome(&job).await?;
                Ok(())
            }
            other => Err(JobError::UnknownJob(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use roster_events::queue::{self, ChannelQueue};

    use super::*;

    /// Fails the first `failures` sends as if the server were down.
    struct FlakyMailer {
        failures: Mutex<u32>,
        sent: Mutex<Vec<WelcomeEmailJob>>,
    }

    impl FlakyMailer {
        fn new(failures: u32) -> Self {
            Self {
                failures: Mutex::new(failures),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Mailer for FlakyMailer {
        async fn send_welcome(&self, job: &WelcomeEmailJob) -> Result<(), MailError> {
            {
                let mut remaining = self.failures.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(MailError::Unavailable("connection refused".to_string()));
                }
            }
            self.sent.lock().unwrap().push(job.clone());
            Ok(())
        }
    }

    fn fast_config(max_attempts: u32) -> WorkerConfig {
        WorkerConfig {
            max_attempts,
            backoff: vec![Duration::ZERO],
        }
    }

    fn bob() -> WelcomeEmailJob {
        WelcomeEmailJob {
            recipient_email: "a@b.com".to_string(),
            recipient_name: "Bob".to_string(),
        }
    }

    #[tokio::test]
    async fn completes_on_first_attempt() {
        let mailer = Arc::new(FlakyMailer::new(0));
        let runner = JobRunner::new(mailer.clone(), fast_config(3));

        let outcome = runner.process(JobEnvelope::new(&bob()).unwrap()).await;

        assert_eq!(outcome, JobOutcome::Completed { attempts: 1 });
        assert_eq!(*mailer.sent.lock().unwrap(), vec![bob()]);
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let mailer = Arc::new(FlakyMailer::new(2));
        let runner = JobRunner::new(mailer.clone(), fast_config(3));

        let outcome = runner.process(JobEnvelope::new(&bob()).unwrap()).await;

        assert_eq!(outcome, JobOutcome::Completed { attempts: 3 });
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let mailer = Arc::new(FlakyMailer::new(10));
        let runner = JobRunner::new(mailer.clone(), fast_config(2));

        let outcome = runner.process(JobEnvelope::new(&bob()).unwrap()).await;

        assert_eq!(outcome, JobOutcome::Exhausted { attempts: 2 });
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_address_is_not_retried() {
        let runner = JobRunner::new(Arc::new(crate::mailer::LogMailer::new()), fast_config(5));
        let job = WelcomeEmailJob {
            recipient_email: "nope".to_string(),
            recipient_name: "Bob".to_string(),
        };

        let outcome = runner.process(JobEnvelope::new(&job).unwrap()).await;
        assert_eq!(outcome, JobOutcome::Discarded { attempts: 1 });
    }

    #[tokio::test]
    async fn unknown_job_is_discarded() {
        let runner = JobRunner::new(Arc::new(FlakyMailer::new(0)), fast_config(3));
        let mut envelope = JobEnvelope::new(&bob()).unwrap();
        envelope.job = "mystery".to_string();

        let outcome = runner.process(envelope).await;
        assert_eq!(outcome, JobOutcome::Discarded { attempts: 1 });
    }

    #[tokio::test]
    async fn run_drains_queue_until_closed() {
        let mailer = Arc::new(FlakyMailer::new(0));
        let runner = JobRunner::new(mailer.clone(), fast_config(1));
        let (queue, receiver) = ChannelQueue::new();

        queue::dispatch(&queue, &bob()).unwrap();
        queue::dispatch(&queue, &bob()).unwrap();
        drop(queue);

        runner.run(receiver, CancellationToken::new()).await;
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn run_stops_when_cancelled() {
        let runner = JobRunner::new(Arc::new(FlakyMailer::new(0)), fast_config(1));
        let (_queue, receiver) = ChannelQueue::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), runner.run(receiver, cancel))
            .await
            .expect("runner should stop once cancelled");
    }
}
