use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::current_user::UserData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Password;
use crate::domain::user::models::Session;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::inbound::http::transport::SessionTransport;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let Json(body) = payload?;

    let email = EmailAddress::new(body.email).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let password =
        Password::new(body.password).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let session = state
        .user_service
        .login(LoginCommand::new(email, password))
        .await?;

    deliver_session(state.transport.as_ref(), &session)
}

/// Hand a freshly issued session to the client through the configured
/// transport.
pub(super) fn deliver_session(
    transport: &dyn SessionTransport,
    session: &Session,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let delivery = transport.deliver(&session.token)?;

    let data = SessionData {
        user: (&session.user).into(),
        expires_at: session.token.expires_at,
        token: delivery.body_token,
    };

    Ok(ApiSuccess::new(StatusCode::OK, data).with_headers(delivery.headers))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    pub user: UserData,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
