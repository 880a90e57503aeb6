//! Password hashing and verification for password-protected links.

use bcrypt::{DEFAULT_COST, hash, verify};

/// Hashes a link password for storage.
///
/// # Errors
///
/// Returns an error if bcrypt fails internally (effectively never for valid
/// UTF-8 input of reasonable length).
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Verifies a caller-supplied password against the stored hash.
///
/// A malformed stored hash is treated as a failed verification rather than an
/// error: the redirect path only needs a yes/no answer.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hashed));
        assert!(!verify_password("hunter3", &hashed));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }
}
