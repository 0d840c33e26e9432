//! "New user registered" notification.
//!
//! Renders one [`UserRecord`] into the payload stored for the `database`
//! channel and the payload pushed over the `broadcast` channel. Rendering is
//! pure; delivery is done by [`NotificationSender`](crate::delivery::NotificationSender).

use chrono::{DateTime, SecondsFormat, Utc};
use roster_core::channels::NotificationChannel;
use roster_core::error::CoreError;
use roster_core::types::{DbId, Timestamp};
use roster_core::user::UserRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification type tag carried in every payload.
pub const USER_REGISTERED: &str = "user_registered";

/// Prefix of the human-readable message.
const MESSAGE_PREFIX: &str = "New user registered: ";

/// Payload stored for the `database` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabasePayload {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The user as nested inside [`BroadcastPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
}

/// Payload pushed for the `broadcast` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastPayload {
    /// Id assigned by the delivering side, echoed unchanged.
    pub id: Uuid,
    pub user: RegisteredUser,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// When this payload was generated, as RFC 3339. Not the user's
    /// registration time, which is `user.created_at`.
    pub created_at: String,
}

/// Announces that a user has registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegisteredNotification {
    user: UserRecord,
}

impl UserRegisteredNotification {
    /// Build the notification, rejecting records without a usable name or
    /// email.
    pub fn new(user: UserRecord) -> Result<Self, CoreError> {
        user.check()?;
        Ok(Self { user })
    }

    pub fn user(&self) -> &UserRecord {
        &self.user
    }

    /// Channels this notification is delivered on. Always both.
    pub fn channels(&self) -> [NotificationChannel; 2] {
        [NotificationChannel::Database, NotificationChannel::Broadcast]
    }

    pub fn message(&self) -> String {
        format!("{MESSAGE_PREFIX}{}", self.user.name)
    }

    pub fn to_database(&self) -> DatabasePayload {
        DatabasePayload {
            id: self.user.id,
            name: self.user.name.clone(),
            email: self.user.email.clone(),
            created_at: self.user.created_at,
            message: self.message(),
            kind: USER_REGISTERED.to_string(),
        }
    }

    /// Broadcast payload stamped with the current time.
    pub fn to_broadcast(&self, notification_id: Uuid) -> BroadcastPayload {
        self.to_broadcast_at(notification_id, Utc::now())
    }

    /// Broadcast payload stamped with `generated_at`.
    pub fn to_broadcast_at(
        &self,
        notification_id: Uuid,
        generated_at: DateTime<Utc>,
    ) -> BroadcastPayload {
        BroadcastPayload {
            id: notification_id,
            user: RegisteredUser {
                id: self.user.id,
                name: self.user.name.clone(),
                email: self.user.email.clone(),
                created_at: self.user.created_at,
            },
            message: self.message(),
            kind: USER_REGISTERED.to_string(),
            created_at: generated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
