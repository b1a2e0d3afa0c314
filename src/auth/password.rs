//! Password Hashing
//! Mission: One-way, salted password storage and verification

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a plaintext password with a fresh random salt.
///
/// The salt and cost factor are internalized into the output string.
pub fn hash_password(plaintext: &str) -> Result<String> {
    hash(plaintext, DEFAULT_COST).context("Failed to hash password")
}

/// Verify a plaintext password against a stored hash.
///
/// Total function: a malformed hash verifies false rather than erroring,
/// so a corrupt row can never authenticate anyone.
pub fn verify_password(plaintext: &str, password_hash: &str) -> bool {
    verify(plaintext, password_hash).unwrap_or(false)
}
