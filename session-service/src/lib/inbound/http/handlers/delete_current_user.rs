use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthContext;
use crate::inbound::http::router::AppState;

/// Delete the user the session belongs to and end the session.
pub async fn delete_current_user(
    State(state): State<AppState>,
    context: AuthContext,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .user_service
        .delete_user(&context.user_id, &context.email)
        .await?;
    tracing::info!(user_id = %context.user_id, "Account closed by its owner");

    let headers = state.transport.clear()?;

    Ok(ApiSuccess::new(StatusCode::OK, MessageData::new("User deleted")).with_headers(headers))
}
