//! Well-known notification channel names.
//!
//! These must match the channel values reported by notifications and the
//! delivery adapters in `roster-events`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Notification persisted to the `notifications` table for later retrieval.
pub const CHANNEL_DATABASE: &str = "database";

/// Notification pushed to the notifiable's live connections.
pub const CHANNEL_BROADCAST: &str = "broadcast";

/// The closed set of delivery channels a notification can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Database,
    Broadcast,
}

impl NotificationChannel {
    /// Wire name of the channel.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Database => CHANNEL_DATABASE,
            Self::Broadcast => CHANNEL_BROADCAST,
        }
    }

    /// Resolve a channel from its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            CHANNEL_DATABASE => Some(Self::Database),
            CHANNEL_BROADCAST => Some(Self::Broadcast),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
