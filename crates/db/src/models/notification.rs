//! Notification entity model.

use roster_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub notifiable_id: DbId,
    pub data: serde_json::Value,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Values needed to insert a notification row.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub id: Uuid,
    pub kind: String,
    pub notifiable_id: DbId,
    pub data: serde_json::Value,
}
