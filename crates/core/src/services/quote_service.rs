use std::time::Duration;

use crate::errors::CoreError;
use crate::providers::traits::QuoteProvider;

/// Time-bounded price lookup that degrades to "unavailable" instead of failing.
///
/// No retries: a missed price waits for the next refresh cycle.
pub struct QuoteSource {
    provider: Box<dyn QuoteProvider>,
    timeout: Duration,
}

impl QuoteSource {
    pub fn new(provider: Box<dyn QuoteProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Latest price for `symbol`, or `None` on timeout, transport failure or a
    /// missing/zero price. Failures are logged here and nowhere else.
    pub async fn fetch_price(&self, symbol: &str) -> Option<f64> {
        match self.try_fetch_price(symbol).await {
            Ok(price) => {
                tracing::debug!(symbol, price, "quote fetched");
                Some(price)
            }
            Err(e) => {
                tracing::warn!(symbol, provider = self.provider.name(), error = %e, "quote unavailable");
                None
            }
        }
    }

    /// Same lookup with the failure reason kept.
    ///
    /// The provider future is dropped when the deadline passes, which cancels
    /// the in-flight request.
    pub async fn try_fetch_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let price = tokio::time::timeout(self.timeout, self.provider.get_latest_price(symbol))
            .await
            .map_err(|_| CoreError::Timeout {
                operation: format!("{} quote", self.provider.name()),
                symbol: symbol.to_string(),
                after: self.timeout,
            })??;

        // Zero means the provider had no trade to report.
        if !price.is_finite() || price <= 0.0 {
            return Err(CoreError::Api {
                provider: self.provider.name().to_string(),
                message: format!("Invalid price returned for {symbol}: {price}"),
            });
        }

        Ok(price)
    }
}
