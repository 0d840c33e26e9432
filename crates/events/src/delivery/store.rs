//! Storage behind the `database` channel.
//!
//! [`NotificationStore`] is the seam the sender and the HTTP layer use;
//! [`PgNotificationStore`] backs it with the `notifications` table.

use async_trait::async_trait;
use roster_core::types::DbId;
use roster_db::models::notification::{NewNotification, Notification};
use roster_db::repositories::NotificationRepo;
use roster_db::DbPool;
use uuid::Uuid;

/// Durable store for notifications delivered on the `database` channel.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a notification, returning its id.
    async fn insert(&self, notification: NewNotification) -> Result<Uuid, sqlx::Error>;

    /// List a notifiable's notifications, newest first.
    async fn list_for(
        &self,
        notifiable_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error>;

    /// Mark one notification read; `false` if it was not found unread.
    async fn mark_read(&self, id: Uuid, notifiable_id: DbId) -> Result<bool, sqlx::Error>;

    /// Mark every unread notification read, returning how many changed.
    async fn mark_all_read(&self, notifiable_id: DbId) -> Result<u64, sqlx::Error>;

    async fn unread_count(&self, notifiable_id: DbId) -> Result<i64, sqlx::Error>;
}

/// PostgreSQL-backed [`NotificationStore`].
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert(&self, notification: NewNotification) -> Result<Uuid, sqlx::Error> {
        NotificationRepo::create(&self.pool, &notification).await
    }

    async fn list_for(
        &self,
        notifiable_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        NotificationRepo::list_for_notifiable(&self.pool, notifiable_id, unread_only, limit, offset)
            .await
    }

    async fn mark_read(&self, id: Uuid, notifiable_id: DbId) -> Result<bool, sqlx::Error> {
        NotificationRepo::mark_read(&self.pool, id, notifiable_id).await
    }

    async fn mark_all_read(&self, notifiable_id: DbId) -> Result<u64, sqlx::Error> {
        NotificationRepo::mark_all_read(&self.pool, notifiable_id).await
    }

    async fn unread_count(&self, notifiable_id: DbId) -> Result<i64, sqlx::Error> {
        NotificationRepo::unread_count(&self.pool, notifiable_id).await
    }
}
