//! Data Transfer Objects for API requests and responses.

pub mod ban;
pub mod health;
pub mod shorten;
