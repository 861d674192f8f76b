//! Password hashing and bearer-token primitives.
//!
//! Passwords are stored as PBKDF2-SHA256 hashes with a per-user salt,
//! in `salt$hash` hex form. Bearer tokens are random 32-byte values
//! handed to the client once; only their SHA-256 hex digest is stored.

use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};

/// PBKDF2 iteration count for password hashing.
const PBKDF2_ITERATIONS: u32 = 600_000;

/// Derived hash length in bytes.
const HASH_LENGTH: usize = 32;

/// Salt length in bytes.
const SALT_LENGTH: usize = 16;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_LENGTH] = rand::random();
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);
    format!("{}${}", hex::encode(salt), hex::encode(hash))
}

/// Verify a password against a stored `salt$hash` string.
///
/// Malformed stored values verify as false rather than erroring; they
/// can only come from manual database edits.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };
    if expected.len() != HASH_LENGTH {
        return false;
    }

    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);

    // Constant-time comparison
    hash.iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a bearer token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let stored = hash_password("correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &stored));
        assert!(!verify_password("correct horse battery stable", &stored));
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = hash_password("hunter2");
        let b = hash_password("hunter2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_stored_hash_fails_closed() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "no-dollar-sign"));
        assert!(!verify_password("pw", "nothex$nothex"));
        assert!(!verify_password("pw", "abcd$1234"));
    }

    #[test]
    fn test_generate_token_is_unique() {
        let t1 = generate_token();
        let t2 = generate_token();
        assert_ne!(t1, t2);
        assert!(!t1.is_empty());
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        assert_eq!(hash_token("token"), hash_token("token"));
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
        assert_eq!(hash_token("token").len(), 64);
    }
}
