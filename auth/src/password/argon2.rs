use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use argon2::password_hash::Error as HashError;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

const SALT_LEN: usize = 16;

/// Argon2id cost factor.
///
/// Raise these as hardware gets faster. Digests record the cost they were
/// produced with, so older digests keep verifying after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashingCost {
    fn params(&self) -> Result<Params, PasswordError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordError::InvalidCost(e.to_string()))
    }
}

/// Password hashing implementation.
///
/// Salted, slow, one-way hashing with Argon2id. Calls are CPU bound by design;
/// async callers should run them on a blocking thread.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a hasher with the default cost.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Create a hasher with an explicit cost.
    ///
    /// # Errors
    /// * `InvalidCost` - Argon2 rejected the parameter combination
    pub fn with_cost(cost: HashingCost) -> Result<Self, PasswordError> {
        Ok(Self {
            params: cost.params()?,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password.
    ///
    /// A fresh random salt is drawn on every call, so hashing the same
    /// plaintext twice yields two different digests.
    ///
    /// # Returns
    /// PHC string format digest (algorithm, parameters, salt and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - The OS RNG failed or hashing itself failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| PasswordError::HashingFailed(format!("entropy source: {}", e)))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored digest.
    ///
    /// The cost recorded in the digest is used, not the hasher's own cost.
    ///
    /// # Errors
    /// * `Mismatch` - The password is wrong
    /// * `MalformedDigest` - The stored digest cannot be parsed or used
    pub fn verify(&self, password: &str, digest: &str) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| PasswordError::MalformedDigest(e.to_string()))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(HashError::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::MalformedDigest(e.to_string())),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
