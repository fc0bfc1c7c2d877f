//! Application configuration.
//!
//! Non-secret settings live in a JSON config file with sensible defaults;
//! credentials and endpoints come from the environment (loaded via dotenvy).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Mint address of the monitored asset.
    pub token_address: String,
    /// SQLite connection string for the pool store.
    pub database_url: String,
    /// Genesis total supply; burn percent is measured against this.
    pub genesis_supply: f64,
    /// Absolute hourly change percent that raises a volatility alert.
    pub volatility_threshold_pct: f64,
    /// UTC hour of the daily summary.
    pub rollover_hour: u32,
    /// Thumbnail shown on price and daily cards.
    pub thumbnail_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            token_address: String::new(),
            database_url: "sqlite://poolwatch.db".to_string(),
            genesis_supply: 420_000_069.0,
            volatility_threshold_pct: 10.0,
            rollover_hour: 0,
            thumbnail_url: None,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Credentials and endpoints, environment-only.
#[derive(Debug, Clone)]
pub struct Secrets {
    /// Discord bot token.
    pub discord_token: String,
    /// Destination channel id.
    pub price_channel: String,
    /// Birdeye API key.
    pub birdeye_api_key: String,
    /// JSON-RPC endpoint for supply and holder lookups.
    pub rpc_url: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        fn require(name: &'static str) -> Result<String, ConfigError> {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnv(name))
        }

        Ok(Self {
            discord_token: require("DISCORD_TOKEN")?,
            price_channel: require("PRICE_CHANNEL")?,
            birdeye_api_key: require("BIRDEYE_API_KEY")?,
            rpc_url: require("RPC_URL")?,
        })
    }
}
