//! Discord alert delivery for the pool monitor.
//!
//! This crate provides:
//! - a minimal Discord REST client for channel messages
//! - embed formatting for price, volatility, new-pool and daily cards
//! - the fire-and-forget event dispatcher

pub mod discord;
pub mod format;
pub mod notifier;

pub use discord::{DiscordClient, DiscordError, Embed, EmbedThumbnail};
pub use notifier::Notifier;
