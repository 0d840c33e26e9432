//! Route definitions for a notifiable's notifications.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/users/{notifiable_id}/notifications`.
///
/// ```text
/// GET    /                          -> list_notifications
/// POST   /user-registered           -> send_user_registered
/// POST   /read-all                  -> mark_all_read
/// GET    /unread-count              -> unread_count
/// POST   /{id}/read                 -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/user-registered", post(notification::send_user_registered))
        .route("/read-all", post(notification::mark_all_read))
        .route("/unread-count", get(notification::unread_count))
        .route("/{id}/read", post(notification::mark_read))
}
