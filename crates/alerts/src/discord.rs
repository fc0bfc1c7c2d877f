//! Discord REST client for channel messages.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Error, Debug)]
pub enum DiscordError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Discord API returned HTTP {0}")]
    Api(u16),
}

/// Embed thumbnail reference.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

/// A structured message card.
#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
}

/// Minimal Discord bot client: post messages into a channel.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl DiscordClient {
    pub fn new(http: reqwest::Client, token: impl Into<String>) -> Self {
        Self::with_api_base(http, token, DEFAULT_API_BASE)
    }

    pub fn with_api_base(
        http: reqwest::Client,
        token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            token: token.into(),
        }
    }

    async fn post_message(
        &self,
        channel_id: &str,
        body: serde_json::Value,
    ) -> Result<(), DiscordError> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(
                channel = channel_id,
                status = response.status().as_u16(),
                "Discord API returned non-success status"
            );
            return Err(DiscordError::Api(response.status().as_u16()));
        }

        Ok(())
    }

    /// Send a plain text message.
    pub async fn send_text(&self, channel_id: &str, content: &str) -> Result<(), DiscordError> {
        self.post_message(channel_id, json!({ "content": content }))
            .await
    }

    /// Send a single embed card.
    pub async fn send_embed(&self, channel_id: &str, embed: &Embed) -> Result<(), DiscordError> {
        self.post_message(channel_id, json!({ "embeds": [embed] }))
            .await
    }
}
