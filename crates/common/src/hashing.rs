//! Password and message hashing helpers
//!
//! Both helpers produce text digests that are stable across releases, so
//! they can be compared against previously stored values.

use crate::error::HashingError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Build the salted password hash as lowercase hex
///
/// The SHA-256 state first absorbs the password; its intermediate digest is
/// taken as hex and the same state then absorbs `salt1`, `username`, `salt2`
/// and that hex digest. Empty salts are accepted.
///
/// # Errors
/// `HashingError::InvalidCredentials` if `username` or `password` is empty.
pub fn build_password_hash(
    username: &str,
    password: &str,
    salt1: &str,
    salt2: &str,
) -> Result<String, HashingError> {
    if username.is_empty() || password.is_empty() {
        return Err(HashingError::InvalidCredentials);
    }

    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    let password_digest = hex::encode(hasher.clone().finalize());

    hasher.update(salt1.as_bytes());
    hasher.update(username.as_bytes());
    hasher.update(salt2.as_bytes());
    hasher.update(password_digest.as_bytes());

    Ok(hex::encode(hasher.finalize()))
}

/// Build a base64 encoded HMAC-SHA256 of `info` keyed with `salt`
///
/// # Errors
/// `HashingError::InvalidInformation` if `info` is empty.
pub fn build_hash_with_one_salt_and_hmac(info: &str, salt: &str) -> Result<String, HashingError> {
    if info.is_empty() {
        return Err(HashingError::InvalidInformation);
    }

    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .map_err(|e| HashingError::InvalidKey(e.to_string()))?;
    mac.update(info.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_password_hash() {
        let out = build_password_hash("username", "password", "salt1", "salt2").unwrap();
        assert_eq!(
            out,
            "b7627008958dd3e311329bfe7be9245e1e1b656e669e8647de62d15f53754882"
        );
    }

    #[test]
    fn test_build_password_hash_accepts_empty_salts() {
        let out = build_password_hash("username", "password", "", "").unwrap();
        assert_eq!(out.len(), 64);
    }

    #[test]
    fn test_build_password_hash_rejects_empty_credentials() {
        assert_eq!(
            build_password_hash("", "", "", "").unwrap_err(),
            HashingError::InvalidCredentials
        );
        assert_eq!(
            build_password_hash("username", "", "salt1", "salt2").unwrap_err(),
            HashingError::InvalidCredentials
        );
    }

    #[test]
    fn test_build_hash_with_one_salt_and_hmac() {
        let out = build_hash_with_one_salt_and_hmac("hmac", "salt").unwrap();
        assert_eq!(out, "0Op+9JpUO6+2GdpWkB2zLHVOt/DFOUKta3IGKjiSBm0=");
    }

    #[test]
    fn test_build_hash_with_one_salt_and_hmac_rejects_empty_info() {
        assert_eq!(
            build_hash_with_one_salt_and_hmac("", "salt").unwrap_err(),
            HashingError::InvalidInformation
        );
    }
}
