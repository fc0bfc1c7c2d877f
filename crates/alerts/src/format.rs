//! Alert message formatting.

use crate::discord::{Embed, EmbedThumbnail};
use poolwatch_core::{DailySummary, Direction, PoolRecord};

const COLOR_UP: u32 = 0x2ECC71;
const COLOR_FLAT: u32 = 0x0099FF;
const COLOR_DOWN: u32 = 0xE74C3C;

/// Glyph shown next to a rate.
pub fn direction_glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "📈",
        Direction::Flat => "➖",
        Direction::Down => "📉",
    }
}

/// Embed accent color for a rate.
pub fn direction_color(direction: Direction) -> u32 {
    match direction {
        Direction::Up => COLOR_UP,
        Direction::Flat => COLOR_FLAT,
        Direction::Down => COLOR_DOWN,
    }
}

/// Format price with appropriate precision based on magnitude.
fn format_price(price: f64) -> String {
    if price == 0.0 {
        return "$0".to_string();
    }
    let abs_price = price.abs();
    if abs_price >= 1000.0 {
        format!("${:.2}", price)
    } else if abs_price >= 1.0 {
        format!("${:.4}", price)
    } else if abs_price >= 0.01 {
        format!("${:.6}", price)
    } else {
        format!("${:.8}", price)
    }
}

/// Routine hourly price card.
pub fn price_embed(
    price_usd: f64,
    rate_percent: f64,
    direction: Direction,
    thumbnail_url: Option<&str>,
) -> Embed {
    Embed {
        title: "**Price**".to_string(),
        description: format!(
            "{}\n{} {:+.1}% (1h)",
            format_price(price_usd),
            direction_glyph(direction),
            rate_percent
        ),
        color: direction_color(direction),
        thumbnail: thumbnail_url.map(|url| EmbedThumbnail {
            url: url.to_string(),
        }),
    }
}

/// Card for an hourly swing past the volatility threshold.
pub fn volatility_embed(rate_percent: f64, direction: Direction) -> Embed {
    Embed {
        title: "🚨 **Big price move**".to_string(),
        description: format!(
            "{} {:+.1}% in the last hour",
            direction_glyph(direction),
            rate_percent
        ),
        color: direction_color(direction),
        thumbnail: None,
    }
}

/// Card for a newly discovered pool.
pub fn new_pool_embed(record: &PoolRecord) -> Embed {
    let mut description = format!("DEX: {}", record.dex_id);
    if let Some(pair) = &record.pair_label {
        description.push_str(&format!("\nPair: {pair}"));
    }
    if let Some(price) = record.price_usd {
        description.push_str(&format!("\nPrice: {}", format_price(price)));
    }
    if let Some(liquidity) = record.liquidity_usd {
        description.push_str(&format!("\nLiquidity: ${liquidity:.0}"));
    }
    if let Some(url) = &record.url {
        description.push_str(&format!("\n{url}"));
    }

    Embed {
        title: "🆕 **New pool detected**".to_string(),
        description,
        color: COLOR_FLAT,
        thumbnail: None,
    }
}

/// Daily summary card posted at the UTC day boundary.
pub fn daily_embed(summary: &DailySummary, thumbnail_url: Option<&str>) -> Embed {
    let direction = Direction::from_rate(summary.change_24h_pct);
    let now = chrono::Utc::now();

    Embed {
        title: "🌅 **It's a new day!**".to_string(),
        description: format!(
            "Price: {}\n{} {:+.1}% (24h)\nSupply: {:.0}\nBurned: {:.4}%\nHolders: {}\n\n⏰ {}",
            format_price(summary.price_usd),
            direction_glyph(direction),
            summary.change_24h_pct,
            summary.supply,
            summary.burned_pct,
            summary.holder_count,
            now.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        color: direction_color(direction),
        thumbnail: thumbnail_url.map(|url| EmbedThumbnail {
            url: url.to_string(),
        }),
    }
}
