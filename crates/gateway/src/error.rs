//! Error types for gateway operations.

use thiserror::Error;

/// Errors that can occur while fetching upstream market data.
///
/// Every variant means the same thing to callers: the value is unavailable
/// this pass. Callers short-circuit and try again on the next tick rather
/// than proceeding with a missing price.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    ConnectionFailed(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("failed to parse response: {0}")]
    ParseError(String),

    #[error("upstream returned HTTP {0}")]
    HttpStatus(u16),

    #[error("upstream reported an error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(err.to_string())
        } else if err.is_decode() {
            GatewayError::ParseError(err.to_string())
        } else {
            GatewayError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::ParseError(err.to_string())
    }
}

impl GatewayError {
    /// Returns true if this error is transient and likely to succeed on the
    /// next scheduled pass.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::ConnectionFailed(_)
                | GatewayError::Timeout(_)
                | GatewayError::HttpStatus(_)
        )
    }
}
