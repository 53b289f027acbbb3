use std::fmt::Display;

use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Identity established from a verified session token.
///
/// Inserted into request extensions by [`authenticate`] and extracted by
/// protected handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub name: DisplayName,
}

impl TryFrom<auth::Claims> for AuthContext {
    type Error = UserError;

    fn try_from(claims: auth::Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_string(&claims.uid)?,
            email: EmailAddress::new(claims.sub)?,
            name: DisplayName::new(claims.name)?,
        })
    }
}

/// Access gate for protected routes.
///
/// Every failure produces the same 401 response; the reason is only logged.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = state
        .transport
        .extract_token(req.headers())
        .ok_or_else(|| reject("no session token presented"))?;

    let claims = state
        .authenticator
        .validate_token(&token)
        .map_err(reject)?;

    let context = AuthContext::try_from(claims).map_err(reject)?;
    tracing::debug!(user_id = %context.user_id, "Session accepted");

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

fn reject(reason: impl Display) -> ApiError {
    tracing::warn!(reason = %reason, "Session rejected");
    ApiError::unauthorized()
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}
