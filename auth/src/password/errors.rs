use thiserror::Error;

/// Error type for password operations.
///
/// `Mismatch` is a credential failure. Every other variant is a system fault.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password does not match")]
    Mismatch,

    #[error("Stored password digest is malformed: {0}")]
    MalformedDigest(String),

    #[error("Invalid hashing cost: {0}")]
    InvalidCost(String),
}

impl PasswordError {
    /// True when the error means "wrong password" rather than a fault.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, PasswordError::Mismatch)
    }
}
