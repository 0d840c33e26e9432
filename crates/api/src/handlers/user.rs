//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use roster_core::user::UserRecord;
use roster_events::UserCreated;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PublishedEvent {
    /// Number of listeners the event was dispatched to.
    pub listeners: usize,
}

/// POST /api/v1/users/created
///
/// Announce a newly persisted user. The record is validated, then
/// `UserCreated` is published; listeners queue their follow-up work and the
/// request returns without waiting for it.
pub async fn user_created(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<(StatusCode, Json<DataResponse<PublishedEvent>>)> {
    let user = UserRecord::from_value(body)?;
    let user_id = user.id;

    let listeners = state.event_bus.publish(&UserCreated { user })?;
    tracing::info!(user_id, listeners, "User created event published");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: PublishedEvent { listeners },
        }),
    ))
}
