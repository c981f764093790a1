use std::time::Duration;

use thiserror::Error;

/// Unified error type for the holdings-monitor-core library.
///
/// Upstream failures never reach readers: the quote and scrape services fold
/// them into the unavailable sentinel. `CoreError` surfaces at the provider
/// boundary, at configuration load time, and at the scheduler's cycle boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration ───────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid holding #{index} ({symbol}): {reason}")]
    InvalidHolding {
        index: usize,
        symbol: String,
        reason: String,
    },

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{operation} for {symbol} timed out after {}ms", after.as_millis())]
    Timeout {
        operation: String,
        symbol: String,
        after: Duration,
    },

    // ── Refresh cycle ───────────────────────────────────────────────
    #[error("Refresh cycle aborted: {0}")]
    CycleAborted(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors embed the full URL; drop the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
