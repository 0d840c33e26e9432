//! Roster event bus and notification infrastructure.
//!
//! This crate provides the building blocks of the onboarding pipeline:
//!
//! - [`EventBus`]: typed, synchronous publish/subscribe registry.
//! - [`UserCreated`]: the event announcing a newly persisted user.
//! - [`WelcomeEmailRelay`]: listener that queues a [`WelcomeEmailJob`] per
//!   created user.
//! - [`queue`]: the job envelope and the queue handoff.
//! - [`notification`]: the "user registered" notification and its payloads.
//! - [`delivery`]: channel adapters and the [`NotificationSender`].

pub mod bus;
pub mod delivery;
pub mod jobs;
pub mod notification;
pub mod queue;
pub mod relay;
pub mod user_created;

pub use bus::{Event, EventBus, ListenerError};
pub use delivery::{BroadcastSink, NotificationSender, NotificationStore, PgNotificationStore};
pub use jobs::WelcomeEmailJob;
pub use notification::UserRegisteredNotification;
pub use queue::{ChannelQueue, JobEnvelope, JobQueue, JobReceiver};
pub use relay::WelcomeEmailRelay;
pub use user_created::UserCreated;
