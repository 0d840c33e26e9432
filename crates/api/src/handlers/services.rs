use axum::extract::State;
use axum::Json;

use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/services
///
/// Every third-party service setting with secrets masked, plus the list of
/// services whose credentials are present.
pub async fn get_services(State(state): State<AppState>) -> Json<DataResponse<serde_json::Value>> {
    Json(DataResponse {
        data: state.services.redacted(),
    })
}
