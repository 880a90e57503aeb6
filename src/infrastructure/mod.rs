//! Infrastructure layer: external system integrations.
//!
//! - [`persistence`] - PostgreSQL repositories (durable links, counter, stats)
//! - [`cache`] - Redis cache tiers for the redirect pipeline
//! - [`ratelimit`] - Distributed admission control over Redis

pub mod cache;
pub mod persistence;
pub mod ratelimit;
