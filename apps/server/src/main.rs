//! Token Pool Monitor - Headless Server
//!
//! Polls market-data sources for a single asset, reconciles pool state into
//! SQLite, and posts price, new-pool and daily-summary alerts to a Discord
//! channel.

mod config;
mod scheduler;

use clap::Parser;
use config::{AppConfig, Secrets};
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use chrono::Utc;
use poolwatch_alerts::{DiscordClient, Notifier};
use poolwatch_engine::{Monitor, MonitorConfig};
use poolwatch_gateway::{
    build_http_client, BirdeyeClient, DexScreenerClient, HttpMarketData, RpcClient,
};
use poolwatch_store::PoolStore;
use scheduler::{ScheduledJob, Scheduler};

/// Pool Monitor CLI
#[derive(Parser, Debug)]
#[command(name = "poolwatch")]
#[command(about = "Single-asset pool monitoring and alert bot", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_logging(&args.log_level);

    info!("🚀 Pool Monitor starting...");

    let config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return;
        }
    };
    if config.token_address.is_empty() {
        error!("token_address is not configured; set it in {}", args.config);
        return;
    }
    info!("  Token: {}", config.token_address);
    info!("  Volatility threshold: ±{}%", config.volatility_threshold_pct);
    info!("  Rollover hour (UTC): {}", config.rollover_hour);

    let secrets = match Secrets::from_env() {
        Ok(secrets) => secrets,
        Err(e) => {
            error!(error = %e, "incomplete environment");
            return;
        }
    };

    let http = match build_http_client() {
        Ok(http) => http,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            return;
        }
    };

    let store = match PoolStore::connect(&config.database_url).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, url = %config.database_url, "failed to open pool store");
            return;
        }
    };
    info!("  Store: {}", config.database_url);

    let gateway = Arc::new(HttpMarketData::new(
        config.token_address.clone(),
        DexScreenerClient::new(http.clone()),
        BirdeyeClient::new(http.clone(), secrets.birdeye_api_key.clone()),
        RpcClient::new(http.clone(), secrets.rpc_url.clone()),
    ));

    let monitor = Arc::new(Monitor::new(
        gateway,
        store,
        MonitorConfig {
            volatility_threshold_pct: config.volatility_threshold_pct,
            rollover_hour: config.rollover_hour,
            genesis_supply: config.genesis_supply,
        },
    ));

    let mut notifier = Notifier::new(
        DiscordClient::new(http, secrets.discord_token.clone()),
        secrets.price_channel.clone(),
    );
    if let Some(url) = &config.thumbnail_url {
        notifier = notifier.with_thumbnail(url.clone());
    }
    let notifier = Arc::new(notifier);

    let mut scheduler = Scheduler::new();

    // Hourly price pass at minute 0 (and once at startup): price card,
    // volatility alert, daily summary at the rollover hour.
    {
        let monitor = monitor.clone();
        let notifier = notifier.clone();
        scheduler.add_job(ScheduledJob::new("price", 0, true, move || {
            let monitor = monitor.clone();
            let notifier = notifier.clone();
            async move {
                match monitor.price_pass(Utc::now()).await {
                    Ok(outcome) => {
                        notifier
                            .post_price(outcome.price_usd, outcome.rate_percent, outcome.direction)
                            .await;
                        notifier.dispatch(&outcome.events).await;
                    }
                    Err(e) => warn!(error = %e, "price pass failed; waiting for next tick"),
                }
            }
        }));
    }

    // Half-hour-offset pool pass at minute 30 (and once at startup):
    // reconcile the pool snapshot, announce newly discovered pools.
    {
        let monitor = monitor.clone();
        let notifier = notifier.clone();
        scheduler.add_job(ScheduledJob::new("pools", 30, true, move || {
            let monitor = monitor.clone();
            let notifier = notifier.clone();
            async move {
                match monitor.pool_pass(Utc::now()).await {
                    Ok(events) => notifier.dispatch(&events).await,
                    Err(e) => warn!(error = %e, "pool pass failed; waiting for next tick"),
                }
            }
        }));
    }

    info!("✓ Scheduler running");
    scheduler.run().await;
}
