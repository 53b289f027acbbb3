//! Session token transport between client and server.
//!
//! Exactly one implementation is selected at startup. The cookie transport
//! never places the token in a response body; the bearer transport has no
//! server-side logout because sessions are stateless.

use std::sync::Arc;

use auth::IssuedToken;
use axum::http::header::InvalidHeaderValue;
use axum::http::header::AUTHORIZATION;
use axum::http::header::COOKIE;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use chrono::Utc;
use thiserror::Error;

use crate::config::SessionConfig;
use crate::config::TransportKind;

const EXPIRED_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

/// What a response must carry to hand a token to the client.
#[derive(Debug, Default)]
pub struct Delivery {
    pub headers: HeaderMap,
    /// Set only when the transport has no other channel than the body
    pub body_token: Option<String>,
}

pub trait SessionTransport: Send + Sync + 'static {
    fn kind(&self) -> TransportKind;

    /// Pull the raw token out of a request, if one is present.
    fn extract_token(&self, headers: &HeaderMap) -> Option<String>;

    fn deliver(&self, issued: &IssuedToken) -> Result<Delivery, TransportError>;

    /// Headers that end the session on the client. Calling this repeatedly
    /// yields identical output.
    fn clear(&self) -> Result<HeaderMap, TransportError>;
}

/// Build the transport configured for this deployment.
pub fn from_config(config: &SessionConfig) -> Arc<dyn SessionTransport> {
    match config.transport {
        TransportKind::Cookie => Arc::new(CookieTransport::new(
            config.cookie_name.clone(),
            config.cookie_path.clone(),
            config.cookie_secure,
        )),
        TransportKind::Bearer => Arc::new(BearerTransport),
    }
}

/// HttpOnly, path-scoped cookie carrying the token.
#[derive(Debug, Clone)]
pub struct CookieTransport {
    name: String,
    path: String,
    secure: bool,
}

impl CookieTransport {
    pub fn new(name: impl Into<String>, path: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            secure,
        }
    }

    fn attributes(&self, expires: &str, max_age: i64) -> String {
        let mut attributes = format!(
            "Path={}; HttpOnly; SameSite=Lax; Expires={}; Max-Age={}",
            self.path, expires, max_age
        );
        if self.secure {
            attributes.push_str("; Secure");
        }
        attributes
    }
}

impl SessionTransport for CookieTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Cookie
    }

    fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| key.trim() == self.name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn deliver(&self, issued: &IssuedToken) -> Result<Delivery, TransportError> {
        let max_age = (issued.expires_at - Utc::now()).num_seconds().max(0);
        let expires = issued
            .expires_at
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        let cookie = format!(
            "{}={}; {}",
            self.name,
            issued.token,
            self.attributes(&expires, max_age)
        );

        let mut headers = HeaderMap::new();
        headers.insert(SET_COOKIE, HeaderValue::from_str(&cookie)?);

        Ok(Delivery {
            headers,
            body_token: None,
        })
    }

    fn clear(&self) -> Result<HeaderMap, TransportError> {
        let cookie = format!("{}=; {}", self.name, self.attributes(EXPIRED_HTTP_DATE, 0));

        let mut headers = HeaderMap::new();
        headers.insert(SET_COOKIE, HeaderValue::from_str(&cookie)?);
        Ok(headers)
    }
}

/// `Authorization: Bearer <token>`; the token is returned in the response body.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerTransport;

impl SessionTransport for BearerTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Bearer
    }

    fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))?
            .trim();

        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn deliver(&self, issued: &IssuedToken) -> Result<Delivery, TransportError> {
        Ok(Delivery {
            headers: HeaderMap::new(),
            body_token: Some(issued.token.clone()),
        })
    }

    fn clear(&self) -> Result<HeaderMap, TransportError> {
        Ok(HeaderMap::new())
    }
}
