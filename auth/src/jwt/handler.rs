use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JsonWebTokenError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// JWT token handler for signing and verifying session tokens.
///
/// Uses HS256 (HMAC with SHA-256). The algorithm is pinned: tokens whose
/// header names any other algorithm are rejected before a key is touched.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
}

impl JwtHandler {
    /// Create a new JWT handler.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing secret, loaded from configuration
    /// * `issuer` - Identity string written into and required on every token
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Losing or leaking the secret invalidates every issued token
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
        }
    }

    /// Issuer identity this handler signs with and accepts.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Sign claims into a JWT token.
    ///
    /// # Errors
    /// * `SigningFailed` - Serialization or signing failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningFailed(e.to_string()))
    }

    /// Verify a JWT token and return its claims.
    ///
    /// # Errors
    /// * `Malformed` - Token or header cannot be parsed (includes `alg: none`)
    /// * `AlgorithmMismatch` - Header names an algorithm other than HS256
    /// * `InvalidSignature` - Signature does not verify with this secret
    /// * `Expired` - Current time is at or past `exp`
    /// * `IssuerMismatch` - `iss` differs from the configured issuer
    /// * `MissingClaim` - A required claim is absent
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        self.check_algorithm(token)?;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation()).map_err(map_error)?;
        let claims = token_data.claims;

        if claims.is_expired(Utc::now().timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    fn check_algorithm(&self, token: &str) -> Result<(), JwtError> {
        let header = decode_header(token).map_err(|e| JwtError::Malformed(e.to_string()))?;

        if header.alg != self.algorithm {
            return Err(JwtError::AlgorithmMismatch {
                expected: format!("{:?}", self.algorithm),
                found: format!("{:?}", header.alg),
            });
        }

        Ok(())
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.algorithms = vec![self.algorithm];
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation
    }
}

fn map_error(error: JsonWebTokenError) -> JwtError {
    match error.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::InvalidIssuer => JwtError::IssuerMismatch,
        ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
        ErrorKind::InvalidAlgorithm => JwtError::AlgorithmMismatch {
            expected: format!("{:?}", Algorithm::HS256),
            found: "unknown".to_string(),
        },
        _ => JwtError::Malformed(error.to_string()),
    }
}
