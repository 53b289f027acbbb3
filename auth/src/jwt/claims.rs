use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Session claim set.
///
/// Every field is required: a token missing any of them never deserializes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the user's email address
    pub sub: String,

    /// Display name
    pub name: String,

    /// User identifier
    pub uid: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for an authenticated user, valid for `ttl` from now.
    ///
    /// # Arguments
    /// * `uid` - Unique user identifier
    /// * `email` - Email address, used as the subject
    /// * `name` - Display name
    /// * `issuer` - Identity of the minting authority
    /// * `ttl` - Lifetime of the token
    ///
    /// # Errors
    /// * `SigningFailed` - Expiry falls outside the representable date range
    pub fn for_user(
        uid: impl ToString,
        email: impl ToString,
        name: impl ToString,
        issuer: impl ToString,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        Self::issued_at(uid, email, name, issuer, Utc::now(), ttl)
    }

    /// Same as [`Claims::for_user`] with an explicit issue instant.
    pub fn issued_at(
        uid: impl ToString,
        email: impl ToString,
        name: impl ToString,
        issuer: impl ToString,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            JwtError::SigningFailed(format!("expiry out of range for ttl {}", ttl))
        })?;

        Ok(Self {
            sub: email.to_string(),
            name: name.to_string(),
            uid: uid.to_string(),
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Absolute expiry instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check if the token is expired. A token is dead from its `exp` second on.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
