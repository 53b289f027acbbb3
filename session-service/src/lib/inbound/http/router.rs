use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::current_user::current_user;
use super::handlers::delete_current_user::delete_current_user;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::ping::ping;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use super::transport::SessionTransport;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub authenticator: Arc<Authenticator>,
    pub transport: Arc<dyn SessionTransport>,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    authenticator: Arc<Authenticator>,
    transport: Arc<dyn SessionTransport>,
) -> Router {
    let state = AppState {
        user_service,
        authenticator,
        transport,
    };

    let public_routes = Router::new()
        .route("/ping", get(ping))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout).post(logout));

    let protected_routes = Router::new()
        .route("/auth/user", get(current_user).delete(delete_current_user))
        .route("/auth/refresh-token", get(refresh_token))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Headers are left out of the span: they carry session tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
