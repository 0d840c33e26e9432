//! Delivery of notifications to their channels.
//!
//! [`NotificationSender`] walks a notification's channels and hands each
//! rendered payload to the matching adapter: the [`NotificationStore`] for
//! `database`, the [`BroadcastSink`] for `broadcast`.

pub mod broadcast;
pub mod store;

use std::sync::Arc;

use roster_core::channels::NotificationChannel;
use roster_core::types::DbId;
use roster_db::models::notification::NewNotification;
use uuid::Uuid;

pub use broadcast::{private_channel, BroadcastSink};
pub use store::{NotificationStore, PgNotificationStore};

use crate::notification::{UserRegisteredNotification, USER_REGISTERED};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Writing to the notification store failed.
    #[error("Notification store error: {0}")]
    Store(#[from] sqlx::Error),

    /// A payload could not be encoded as JSON.
    #[error("Notification payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// NotificationSender
// ---------------------------------------------------------------------------

/// Sends notifications to a notifiable over every channel they declare.
#[derive(Clone)]
pub struct NotificationSender {
    store: Arc<dyn NotificationStore>,
    sink: Arc<dyn BroadcastSink>,
}

impl NotificationSender {
    pub fn new(store: Arc<dyn NotificationStore>, sink: Arc<dyn BroadcastSink>) -> Self {
        Self { store, sink }
    }

    /// Deliver `notification` to `notifiable_id`.
    ///
    /// One id is assigned per notification and shared by every channel, so
    /// the stored row and the pushed payload can be correlated by clients.
    /// Channels are delivered in order; a store failure aborts before the
    /// broadcast.
    pub async fn send(
        &self,
        notifiable_id: DbId,
        notification: &UserRegisteredNotification,
    ) -> Result<Uuid, DeliveryError> {
        let id = Uuid::new_v4();

        for channel in notification.channels() {
            match channel {
                NotificationChannel::Database => {
                    let data = serde_json::to_value(notification.to_database())?;
                    self.store
                        .insert(NewNotification {
                            id,
                            kind: USER_REGISTERED.to_string(),
                            notifiable_id,
                            data,
                        })
                        .await?;
                    tracing::info!(
                        notification_id = %id,
                        notifiable_id,
                        %channel,
                        "Notification stored"
                    );
                }
                NotificationChannel::Broadcast => {
                    let payload = serde_json::to_value(notification.to_broadcast(id))?;
                    let reached = self.sink.push(notifiable_id, payload).await;
                    tracing::info!(
                        notification_id = %id,
                        notifiable_id,
                        %channel,
                        reached,
                        "Notification broadcast"
                    );
                }
            }
        }

        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use roster_core::user::UserRecord;
    use roster_db::models::notification::Notification;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<NewNotification>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationStore for MemoryStore {
        async fn insert(&self, notification: NewNotification) -> Result<Uuid, sqlx::Error> {
            if self.fail {
                return Err(sqlx::Error::PoolClosed);
            }
            let id = notification.id;
            self.rows.lock().unwrap().push(notification);
            Ok(id)
        }

        async fn list_for(
            &self,
            _notifiable_id: DbId,
            _unread_only: bool,
            _limit: i64,
            _offset: i64,
        ) -> Result<Vec<Notification>, sqlx::Error> {
            Ok(Vec::new())
        }

        async fn mark_read(&self, _id: Uuid, _notifiable_id: DbId) -> Result<bool, sqlx::Error> {
            Ok(false)
        }

        async fn mark_all_read(&self, _notifiable_id: DbId) -> Result<u64, sqlx::Error> {
            Ok(0)
        }

        async fn unread_count(&self, _notifiable_id: DbId) -> Result<i64, sqlx::Error> {
            Ok(0)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        pushed: Mutex<Vec<(DbId, serde_json::Value)>>,
    }

    #[async_trait]
    impl BroadcastSink for RecordingSink {
        async fn push(&self, notifiable_id: DbId, payload: serde_json::Value) -> usize {
            self.pushed.lock().unwrap().push((notifiable_id, payload));
            1
        }
    }

    fn notification() -> UserRegisteredNotification {
        UserRegisteredNotification::new(UserRecord {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn send_stores_and_broadcasts_with_shared_id() {
        let store = Arc::new(MemoryStore::default());
        let sink = Arc::new(RecordingSink::default());
        let sender = NotificationSender::new(store.clone(), sink.clone());

        let id = sender.send(42, &notification()).await.unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].notifiable_id, 42);
        assert_eq!(rows[0].kind, "user_registered");
        assert_eq!(rows[0].data["message"], "New user registered: Ada");
        assert_eq!(rows[0].data["id"], 7);

        let pushed = sink.pushed.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].0, 42);
        assert_eq!(pushed[0].1["id"], id.to_string());
        assert_eq!(pushed[0].1["user"]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn store_failure_skips_broadcast() {
        let store = Arc::new(MemoryStore {
            fail: true,
            ..Default::default()
        });
        let sink = Arc::new(RecordingSink::default());
        let sender = NotificationSender::new(store, sink.clone());

        let result = sender.send(42, &notification()).await;
        assert_matches!(result, Err(DeliveryError::Store(_)));
        assert!(sink.pushed.lock().unwrap().is_empty());
    }

    #[test]
    fn private_channel_is_scoped_per_notifiable() {
        assert_eq!(private_channel(42), "users.42");
    }
}
