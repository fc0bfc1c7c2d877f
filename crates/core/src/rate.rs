//! Pure rate math: change percentages, rounding policy, rollover predicate.

use serde::{Deserialize, Serialize};

/// Price movement direction for one computed rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Flat,
    Down,
}

impl Direction {
    /// Classify a rate: positive is up, exactly zero is flat.
    pub fn from_rate(rate_percent: f64) -> Self {
        if rate_percent > 0.0 {
            Direction::Up
        } else if rate_percent < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }
}

/// Percentage change between two price samples:
/// `(current / previous) * 100 - 100`.
/// A non-positive previous sample yields 0.0 rather than dividing by zero.
pub fn change_percent(previous: f64, current: f64) -> f64 {
    if previous <= 0.0 {
        return 0.0;
    }
    (current / previous) * 100.0 - 100.0
}

/// Rounding policy for the hourly bucket: one decimal place, and raw rates
/// strictly between -0.1% and 0% snap to exactly 0.0 so sub-threshold jitter
/// never flaps the down indicator.
pub fn round_hourly_rate(raw: f64) -> f64 {
    if raw > -0.1 && raw < 0.0 {
        return 0.0;
    }
    (raw * 10.0).round() / 10.0
}

/// Cumulative deflation versus genesis supply, percent:
/// `((genesis - current) / genesis) * 100`.
pub fn supply_burn_percent(current_supply: f64, genesis_supply: f64) -> f64 {
    if genesis_supply <= 0.0 {
        return 0.0;
    }
    (genesis_supply - current_supply) / genesis_supply * 100.0
}

/// Day-rollover predicate: fires when the current UTC hour equals the
/// configured trigger hour. Intentionally coarse; de-duplication within the
/// trigger hour is the scheduler cadence's responsibility.
pub fn is_rollover_hour(utc_hour: u32, trigger_hour: u32) -> bool {
    utc_hour == trigger_hour
}
