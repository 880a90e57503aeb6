//! Utility functions shared across the serving core.
//!
//! - [`codec`] - Base62 short-code encoding and decoding
//! - [`ip_hash`] - Salted one-way hashing of client IPs
//! - [`password`] - Password hashing for protected links
//! - [`url_normalizer`] - Destination URL validation

pub mod codec;
pub mod ip_hash;
pub mod password;
pub mod url_normalizer;
