//! One-way credential hashing.

use crate::result::AppResult;

/// Password hash + verify primitive.
///
/// Implemented with Argon2id in `authapi-auth`.
pub trait CredentialHasher: Send + Sync + std::fmt::Debug + 'static {
    /// Hash a plaintext password with a fresh salt.
    fn hash(&self, password: &str) -> AppResult<String>;

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is
    /// unreadable or hashing itself fails.
    fn verify(&self, password: &str, hash: &str) -> AppResult<bool>;
}
