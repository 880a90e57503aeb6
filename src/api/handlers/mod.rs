//! HTTP request handlers.

pub mod bans;
pub mod health;
pub mod redirect;
pub mod shorten;

pub use bans::{ban_handler, unban_handler};
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
