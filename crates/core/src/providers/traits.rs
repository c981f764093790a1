use async_trait::async_trait;

use crate::errors::CoreError;

/// Structured market-data source returning a single latest price.
///
/// Implementations report every failure as an error; the timeout, validation
/// and degrade-to-unavailable policy lives in `QuoteSource`, so a provider can
/// be swapped without touching that policy.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest traded price for `symbol` in its native currency.
    async fn get_latest_price(&self, symbol: &str) -> Result<f64, CoreError>;
}

/// Source of raw quote-page markup for the metric scraper.
#[async_trait]
pub trait PageProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the page for `symbol`. Non-2xx responses are errors.
    async fn fetch_page(&self, symbol: &str) -> Result<String, CoreError>;
}
