//! Application services.
//!
//! - [`keygen_service`] - pre-minted short-code pool over the durable counter
//! - [`redirect_service`] - the redirect resolution pipeline
//! - [`shorten_service`] - link creation
//! - [`click_flush`] - periodic click rollup into durable stats

pub mod click_flush;
pub mod keygen_service;
pub mod redirect_service;
pub mod shorten_service;

pub use keygen_service::{KeygenError, KeygenService};
pub use redirect_service::{RedirectOutcome, RedirectService};
pub use shorten_service::{ShortenRequest, ShortenService};
