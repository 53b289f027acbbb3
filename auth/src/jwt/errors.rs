use thiserror::Error;

/// Error type for JWT operations.
///
/// The variants exist for diagnostics. Callers facing a client report every
/// verification failure as the same unauthorized outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token algorithm {found} does not match expected {expected}")]
    AlgorithmMismatch { expected: String, found: String },

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token issuer does not match")]
    IssuerMismatch,

    #[error("Missing required claim: {0}")]
    MissingClaim(String),
}
