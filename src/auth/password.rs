// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification using Argon2id.
//!
//! Digests use the PHC string format with a random per-hash salt.
//! Verification distinguishes "wrong password" (`Ok(false)`) from a
//! malformed stored digest (`Err`), so callers can map the former to an
//! ordinary authentication failure and the latter to a server error.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use super::error::AuthError;

/// Hash a plaintext password into an Argon2id PHC string.
pub fn hash(password: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| AuthError::Crypto(format!("salt generation failed: {e}")))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthError::Crypto(format!("salt encoding failed: {e}")))?;

    let argon2 = Argon2::default();
    let digest = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Crypto(format!("hashing failed: {e}")))?
        .to_string();
    Ok(digest)
}

/// Verify a plaintext password against a stored PHC-format digest.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored digest is malformed.
pub fn verify(password: &str, digest: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| AuthError::Crypto(format!("invalid digest format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let digest = hash("hunter2").unwrap();
        assert!(verify("hunter2", &digest).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let digest = hash("hunter2").unwrap();
        assert!(!verify("wrong", &digest).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("hunter2").unwrap();
        let b = hash("hunter2").unwrap();
        assert_ne!(a, b);
        assert!(verify("hunter2", &a).unwrap());
        assert!(verify("hunter2", &b).unwrap());
    }

    #[test]
    fn cross_password_verification_fails() {
        let a = hash("first password").unwrap();
        assert!(!verify("second password", &a).unwrap());
    }

    #[test]
    fn malformed_digest_is_an_error_not_a_mismatch() {
        let result = verify("pw", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::Crypto(_))));
    }
}
