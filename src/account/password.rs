//! Argon2id password hashing.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password into a PHC string with a fresh random salt.
///
/// # Errors
/// Returns an error if the hasher rejects its parameters.
pub fn hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("hashing password: {err}"))?;
    Ok(hash.to_string())
}

/// Check a plaintext password against a stored PHC string.
///
/// An unparseable hash counts as a mismatch rather than an error; the caller
/// only needs a yes/no answer.
#[must_use]
pub fn verify(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash("hunter22").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify("hunter22", &hash));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash("hunter22").expect("hash");
        assert!(!verify("hunter23", &hash));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash("same input").expect("hash");
        let b = hash("same input").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_is_a_mismatch_not_a_panic() {
        assert!(!verify("anything", "not-a-phc-string"));
        assert!(!verify("anything", ""));
    }
}
