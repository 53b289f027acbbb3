//! Credential and session token primitives.
//!
//! - Password hashing (Argon2id, tunable cost)
//! - Session token signing and verification (HS256 JWT, pinned algorithm,
//!   required issuer, hard expiry)
//! - Authentication coordination
//!
//! Nothing here performs I/O. Secrets are always supplied by the caller.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &digest).is_ok());
//! assert!(hasher.verify("other", &digest).unwrap_err().is_mismatch());
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     "my-authority",
//!     Duration::minutes(30),
//! );
//!
//! // Register: hash password
//! let digest = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let issued = auth
//!     .authenticate("password123", &digest, "user-1", "alice@example.com", "Alice")
//!     .unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&issued.token).unwrap();
//! assert_eq!(claims.sub, "alice@example.com");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::IssuedToken;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::HashingCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
