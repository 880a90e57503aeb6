//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for durable data access; implementations live
//! in `crate::infrastructure::persistence`, and `mockall` generates mocks for
//! unit tests.
//!
//! - [`LinkRepository`] - Link lookup and creation
//! - [`CounterRepository`] - Atomic range reservation for short codes
//! - [`StatsRepository`] - Daily click rollup

pub mod counter_repository;
pub mod link_repository;
pub mod stats_repository;

pub use counter_repository::CounterRepository;
pub use link_repository::LinkRepository;
pub use stats_repository::StatsRepository;

#[cfg(test)]
pub use counter_repository::MockCounterRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use stats_repository::MockStatsRepository;
