//! Repository for the `notifications` table.

use roster_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::notification::{NewNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, type, notifiable_id, data, read_at, created_at";

/// Provides CRUD operations for stored notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification row. The id is assigned by the caller.
    pub async fn create(pool: &PgPool, input: &NewNotification) -> Result<Uuid, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications (id, type, notifiable_id, data) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(input.id)
        .bind(&input.kind)
        .bind(input.notifiable_id)
        .bind(&input.data)
        .fetch_one(pool)
        .await
    }

    /// List notifications for a notifiable, newest first.
    ///
    /// When `unread_only` is `true`, only rows with `read_at IS NULL` are
    /// returned.
    pub async fn list_for_notifiable(
        pool: &PgPool,
        notifiable_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND read_at IS NULL"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE notifiable_id = $1 {filter} \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(notifiable_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if an unread notification was found for the given
    /// notifiable and updated, `false` otherwise.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: Uuid,
        notifiable_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET read_at = NOW() \
             WHERE id = $1 AND notifiable_id = $2 AND read_at IS NULL",
        )
        .bind(notification_id)
        .bind(notifiable_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read for a notifiable.
    ///
    /// Returns the number of notifications that were marked read.
    pub async fn mark_all_read(pool: &PgPool, notifiable_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET read_at = NOW() \
             WHERE notifiable_id = $1 AND read_at IS NULL",
        )
        .bind(notifiable_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Get the number of unread notifications for a notifiable.
    pub async fn unread_count(pool: &PgPool, notifiable_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE notifiable_id = $1 AND read_at IS NULL",
        )
        .bind(notifiable_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
