//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx.
//!
//! - [`PgLinkRepository`] - Link lookup and creation
//! - [`PgCounterRepository`] - Atomic code-range reservation
//! - [`PgStatsRepository`] - Daily click rollup

pub mod pg_counter_repository;
pub mod pg_link_repository;
pub mod pg_stats_repository;

pub use pg_counter_repository::PgCounterRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_stats_repository::PgStatsRepository;
