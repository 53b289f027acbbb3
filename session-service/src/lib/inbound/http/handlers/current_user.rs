use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthContext;
use crate::inbound::http::router::AppState;

/// Profile of the user the session belongs to.
///
/// The user is re-read from storage, so a session that outlived its user
/// is rejected.
pub async fn current_user(
    State(state): State<AppState>,
    context: AuthContext,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .user_service
        .current_user(&context.user_id, &context.email)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// Public view of a user. Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}
