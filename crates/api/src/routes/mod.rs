pub mod health;
pub mod notification;
pub mod services;
pub mod user;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws?user_id={id}                                         WebSocket
///
/// /users/created                                           announce a created user (POST)
///
/// /users/{notifiable_id}/notifications                     list
/// /users/{notifiable_id}/notifications/user-registered     send (POST)
/// /users/{notifiable_id}/notifications/read-all            mark all read (POST)
/// /users/{notifiable_id}/notifications/unread-count        unread count
/// /users/{notifiable_id}/notifications/{id}/read           mark read (POST)
///
/// /services                                                redacted service settings
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/users", user::router())
        .nest("/users/{notifiable_id}/notifications", notification::router())
        .nest("/services", services::router())
}
