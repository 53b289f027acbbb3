use axum::extract::State;

use super::login::deliver_session;
use super::login::SessionData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthContext;
use crate::inbound::http::router::AppState;

/// Issue a new token with a fresh expiry for an already valid session.
pub async fn refresh_token(
    State(state): State<AppState>,
    context: AuthContext,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let session = state
        .user_service
        .refresh_session(&context.user_id, &context.email)
        .await?;

    deliver_session(state.transport.as_ref(), &session)
}
