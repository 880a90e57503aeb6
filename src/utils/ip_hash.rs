//! Salted one-way hashing of client network identity.
//!
//! Ban entries and rate-limit keys are stored under a hash of the client IP
//! rather than the raw address, so the shared store never holds plain IPs.

use sha2::{Digest, Sha256};

/// Length of the hex digest kept for cache keys.
const HASH_PREFIX_LEN: usize = 32;

/// Hashes a client IP with the configured salt.
///
/// Returns the first 32 hex characters of `SHA-256(ip || salt)`. A missing
/// IP (e.g. unparseable peer address) hashes to the literal `"unknown"`
/// bucket so such clients still share one rate-limit/ban key.
pub fn hash_ip(ip: Option<&str>, salt: &str) -> String {
    let Some(ip) = ip else {
        return "unknown".to_string();
    };

    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(salt.as_bytes());

    let digest = hex::encode(hasher.finalize());
    digest[..HASH_PREFIX_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        let a = hash_ip(Some("203.0.113.7"), "salt");
        let b = hash_ip(Some("203.0.113.7"), "salt");
        assert_eq!(a, b);
        assert_eq!(a.len(), HASH_PREFIX_LEN);
    }

    #[test]
    fn test_salt_changes_hash() {
        let a = hash_ip(Some("203.0.113.7"), "salt-a");
        let b = hash_ip(Some("203.0.113.7"), "salt-b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_ips_differ() {
        let a = hash_ip(Some("203.0.113.7"), "salt");
        let b = hash_ip(Some("203.0.113.8"), "salt");
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_ip_buckets_to_unknown() {
        assert_eq!(hash_ip(None, "salt"), "unknown");
    }

    #[test]
    fn test_output_is_lowercase_hex() {
        let h = hash_ip(Some("198.51.100.1"), "salt");
        assert!(
            h.chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        );
    }
}
