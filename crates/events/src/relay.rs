//! Relay from [`UserCreated`] to the welcome email job.
//!
//! [`WelcomeEmailRelay`] is registered on the [`EventBus`] at start-up. For
//! every created user it queues exactly one [`WelcomeEmailJob`] and returns
//! without waiting for the job to run. Deduplication and retries are not its
//! concern.

use std::sync::Arc;

use roster_core::error::CoreError;

use crate::bus::EventBus;
use crate::jobs::WelcomeEmailJob;
use crate::queue::{self, JobQueue, QueueError};
use crate::user_created::UserCreated;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The event's user record is missing required fields.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The job could not be handed to the queue.
    #[error("Failed to queue welcome email: {0}")]
    Queue(#[from] QueueError),
}

/// Turns user-creation events into queued welcome emails.
#[derive(Clone)]
pub struct WelcomeEmailRelay {
    queue: Arc<dyn JobQueue>,
}

impl WelcomeEmailRelay {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }

    /// Queue the welcome email for the user in `event`.
    ///
    /// The user record is validated first; an invalid record queues nothing.
    pub fn handle(&self, event: &UserCreated) -> Result<(), RelayError> {
        let user = &event.user;
        user.check()?;

        let job = WelcomeEmailJob {
            recipient_email: user.email.clone(),
            recipient_name: user.name.clone(),
        };
        let job_id = queue::dispatch(self.queue.as_ref(), &job)?;

        tracing::info!(user_id = user.id, job_id = %job_id, "Welcome email queued");
        Ok(())
    }

    /// Subscribe this relay to [`UserCreated`] on `bus`.
    pub fn register(self, bus: &mut EventBus) {
        bus.listen(move |event: &UserCreated| self.handle(event).map_err(Into::into));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
