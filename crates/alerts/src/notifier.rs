//! Event-to-channel dispatch.

use crate::discord::DiscordClient;
use crate::format;
use poolwatch_core::{ChangeEvent, Direction};
use tracing::{error, info};

/// Dispatches engine events to one Discord channel.
///
/// Delivery is fire-and-forget: failures are logged and swallowed so a dead
/// channel can never abort a pass, and the channel is never notified about
/// the monitor's own internal failures.
pub struct Notifier {
    client: DiscordClient,
    channel_id: String,
    thumbnail_url: Option<String>,
}

impl Notifier {
    pub fn new(client: DiscordClient, channel_id: impl Into<String>) -> Self {
        Self {
            client,
            channel_id: channel_id.into(),
            thumbnail_url: None,
        }
    }

    /// Attach a thumbnail shown on price and daily cards.
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Post the routine hourly price card.
    pub async fn post_price(&self, price_usd: f64, rate_percent: f64, direction: Direction) {
        let embed = format::price_embed(
            price_usd,
            rate_percent,
            direction,
            self.thumbnail_url.as_deref(),
        );
        self.send(&embed, "price").await;
    }

    /// Post one card per engine event.
    pub async fn dispatch(&self, events: &[ChangeEvent]) {
        for event in events {
            let (embed, kind) = match event {
                ChangeEvent::NewPool { record } => (format::new_pool_embed(record), "new_pool"),
                ChangeEvent::PriceVolatility {
                    rate_percent,
                    direction,
                } => (
                    format::volatility_embed(*rate_percent, *direction),
                    "volatility",
                ),
                ChangeEvent::DayRollover { summary } => (
                    format::daily_embed(summary, self.thumbnail_url.as_deref()),
                    "rollover",
                ),
            };
            self.send(&embed, kind).await;
        }
    }

    async fn send(&self, embed: &crate::discord::Embed, kind: &str) {
        match self.client.send_embed(&self.channel_id, embed).await {
            Ok(()) => info!(channel = %self.channel_id, kind, "alert sent"),
            Err(e) => error!(channel = %self.channel_id, kind, error = %e, "failed to send alert"),
        }
    }
}
