use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds the only process-wide secrets of the system. Built once at startup
/// and shared read-only between requests.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    ttl: Duration,
}

/// A freshly signed session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Signed JWT
    pub token: String,
    /// Absolute instant at which the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `issuer` - Issuer identity stamped on and required from every token
    /// * `ttl` - Lifetime of issued tokens
    pub fn new(jwt_secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret, issuer),
            ttl,
        }
    }

    /// Replace the password hasher, e.g. to apply a configured cost.
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issuer(&self) -> &str {
        self.jwt_handler.issuer()
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored digest.
    ///
    /// # Errors
    /// * `Mismatch` - Wrong password
    /// * `MalformedDigest` - Stored digest is corrupt
    pub fn verify_password(&self, password: &str, digest: &str) -> Result<(), PasswordError> {
        self.password_hasher.verify(password, digest)
    }

    /// Verify credentials and issue a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored digest unusable
    /// * `JwtError` - Token signing failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: impl ToString,
        email: &str,
        name: &str,
    ) -> Result<IssuedToken, AuthenticationError> {
        match self.password_hasher.verify(password, stored_hash) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => return Err(AuthenticationError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        }

        Ok(self.issue_token(user_id, email, name)?)
    }

    /// Issue a token without password verification.
    ///
    /// Used for refresh flows, where the caller already holds a valid session.
    ///
    /// # Errors
    /// * `SigningFailed` - Token generation failed
    pub fn issue_token(
        &self,
        user_id: impl ToString,
        email: &str,
        name: &str,
    ) -> Result<IssuedToken, JwtError> {
        let claims = Claims::for_user(user_id, email, name, self.issuer(), self.ttl)?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| JwtError::SigningFailed("expiry out of range".to_string()))?;
        let token = self.jwt_handler.encode(&claims)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// * `JwtError` - Any signature, algorithm, expiry or issuer failure
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
