//! Engine output events.

use crate::{Direction, PoolRecord};
use serde::{Deserialize, Serialize};

/// Daily summary assembled at the UTC day boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Spot price at rollover time.
    pub price_usd: f64,
    /// Change since the previous rollover sample, percent.
    pub change_24h_pct: f64,
    /// Current circulating supply.
    pub supply: f64,
    /// Cumulative burn versus genesis supply, percent.
    pub burned_pct: f64,
    /// Token-account count (coarse holder approximation).
    pub holder_count: u64,
}

/// A notable state change detected during one pass.
/// Consumed immediately by the dispatcher; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// A pool was observed for the first time.
    NewPool { record: PoolRecord },
    /// The hourly change rate crossed the volatility threshold.
    PriceVolatility { rate_percent: f64, direction: Direction },
    /// The UTC day rolled over.
    DayRollover { summary: DailySummary },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_matches() {
        let event = ChangeEvent::PriceVolatility {
            rate_percent: 12.5,
            direction: Direction::Up,
        };
        assert!(matches!(event, ChangeEvent::PriceVolatility { .. }));
    }
}
