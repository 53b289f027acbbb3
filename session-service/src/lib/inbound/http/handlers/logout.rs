use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::router::AppState;

/// End the session on the client. Succeeds with or without a session.
pub async fn logout(State(state): State<AppState>) -> Result<ApiSuccess<MessageData>, ApiError> {
    let headers = state.transport.clear()?;

    Ok(ApiSuccess::new(StatusCode::OK, MessageData::new("Logged out")).with_headers(headers))
}
