use async_trait::async_trait;

use crate::errors::CoreError;
use super::traits::QuoteProvider;

/// Yahoo Finance provider for equity prices.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API), but bursts get throttled.
/// - **Coverage**: Global equities including NSE (`.NS`) and BSE (`.BO`) listings.
///
/// Uses the `yahoo_finance_api` crate. Reads the chart metadata's
/// `regularMarketPrice`, falling back to the latest daily bar's close.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to create connector: {e}"),
            })?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let regular = resp.metadata().ok().and_then(|meta| meta.regular_market_price);
        let close = resp.last_quote().ok().map(|quote| quote.close);

        market_price(regular, close).ok_or_else(|| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("No quote data for {symbol}"),
        })
    }
}

/// The regular-market price when the chart metadata carries a usable one,
/// else the close of the latest bar.
fn market_price(regular: Option<f64>, close: Option<f64>) -> Option<f64> {
    regular
        .filter(|price| price.is_finite() && *price > 0.0)
        .or(close)
}
