//! Pool-state reconciliation and change-detection engine.
//!
//! This crate contains the stateful core of the monitor: diffing upstream
//! pool snapshots against the persisted store, the store-backed rate
//! calculator, and the day-rollover summary. It owns no timing logic beyond
//! the rollover predicate; the scheduler in the server binary decides when
//! passes run.

pub mod monitor;
pub mod rates;
pub mod reconcile;

pub use monitor::*;
pub use rates::*;
pub use reconcile::*;

use poolwatch_gateway::GatewayError;
use poolwatch_store::StoreError;
use thiserror::Error;

/// Errors that abort a pass. Never fatal to the process: the next scheduled
/// tick runs independently.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("upstream unavailable: {0}")]
    Gateway(#[from] GatewayError),

    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
}
