//! Handlers for a notifiable's notifications.
//!
//! The notifiable is always addressed by the `{notifiable_id}` path segment.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use roster_core::error::CoreError;
use roster_core::types::DbId;
use roster_core::user::UserRecord;
use roster_db::models::notification::Notification;
use roster_events::UserRegisteredNotification;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Maximum page size for notification listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for notification listing.
const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Serialize)]
pub struct SentNotification {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Send
// ---------------------------------------------------------------------------

/// POST /api/v1/users/{notifiable_id}/notifications/user-registered
///
/// Tell `notifiable_id` that the user in the body has registered. The
/// notification is stored and pushed to the notifiable's live sockets; the
/// shared id is returned.
pub async fn send_user_registered(
    State(state): State<AppState>,
    Path(notifiable_id): Path<DbId>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<(StatusCode, Json<DataResponse<SentNotification>>)> {
    let user = UserRecord::from_value(body)?;
    let notification = UserRegisteredNotification::new(user)?;

    let id = state.notifier.send(notifiable_id, &notification).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: SentNotification { id },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// GET /api/v1/users/{notifiable_id}/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(notifiable_id): Path<DbId>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);
    let unread_only = params.unread_only.unwrap_or(false);

    let notifications = state
        .store
        .list_for(notifiable_id, unread_only, limit, offset)
        .await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// POST /api/v1/users/{notifiable_id}/notifications/{id}/read
///
/// Returns 204 No Content on success, or 404 if the notifiable has no such
/// unread notification.
pub async fn mark_read(
    State(state): State<AppState>,
    Path((notifiable_id, id)): Path<(DbId, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let found = state.store.mark_read(id, notifiable_id).await?;

    if !found {
        return Err(CoreError::NotFound {
            entity: "Notification",
            id: id.to_string(),
        }
        .into());
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/{notifiable_id}/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(notifiable_id): Path<DbId>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked_read = state.store.mark_all_read(notifiable_id).await?;

    Ok(Json(DataResponse {
        data: MarkedRead { marked_read },
    }))
}

/// GET /api/v1/users/{notifiable_id}/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Path(notifiable_id): Path<DbId>,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let count = state.store.unread_count(notifiable_id).await?;

    Ok(Json(DataResponse {
        data: UnreadCount { count },
    }))
}
