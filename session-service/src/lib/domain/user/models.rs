use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a live registered user. Soft-deleted records never surface
/// through the repository.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub name: DisplayName,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. Surrounding
/// whitespace is trimmed before validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_string();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name, shown to users and never used for lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MAX_LENGTH: usize = 100;

    /// Create a new display name.
    ///
    /// # Errors
    /// * `Empty` - Name is blank after trimming
    /// * `TooLong` - Name is longer than 100 characters
    pub fn new(name: String) -> Result<Self, NameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length == 0 {
            Err(NameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password as received from a client.
///
/// Lives only for the duration of a register or login call.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    const MAX_BYTES: usize = 1024;

    /// # Errors
    /// * `Empty` - Password is empty
    /// * `TooLong` - Password exceeds 1024 bytes
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.is_empty() {
            Err(PasswordPolicyError::Empty)
        } else if password.len() > Self::MAX_BYTES {
            Err(PasswordPolicyError::TooLong {
                max: Self::MAX_BYTES,
                actual: password.len(),
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Command to register a new user
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub name: DisplayName,
}

impl RegisterCommand {
    pub fn new(email: EmailAddress, password: Password, name: DisplayName) -> Self {
        Self {
            email,
            password,
            name,
        }
    }
}

/// Command to open a session with email and password
#[derive(Debug)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: Password,
}

impl LoginCommand {
    pub fn new(email: EmailAddress, password: Password) -> Self {
        Self { email, password }
    }
}

/// An authenticated user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: auth::IssuedToken,
}
