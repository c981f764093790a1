use std::time::Duration;

use crate::errors::CoreError;
use crate::extraction::rules::MetricRules;
use crate::models::record::ScrapedMetrics;
use crate::providers::traits::PageProvider;

/// Fetches a quote page and pulls the valuation ratio and latest earnings
/// figure out of it.
///
/// Transport failures blank both fields; an extraction miss blanks only the
/// field whose rule chain found nothing.
pub struct MetricScraper {
    pages: Box<dyn PageProvider>,
    rules: MetricRules,
    timeout: Duration,
}

impl MetricScraper {
    pub fn new(pages: Box<dyn PageProvider>, rules: MetricRules, timeout: Duration) -> Self {
        Self {
            pages,
            rules,
            timeout,
        }
    }

    /// Swap the extraction rules, e.g. after an upstream layout change.
    pub fn with_rules(mut self, rules: MetricRules) -> Self {
        self.rules = rules;
        self
    }

    pub async fn fetch_metrics(&self, symbol: &str) -> ScrapedMetrics {
        let html = match self.fetch_page(symbol).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(symbol, provider = self.pages.name(), error = %e, "quote page unavailable");
                return ScrapedMetrics::unavailable();
            }
        };

        // Parsed outside any await: the document tree is not `Send`.
        let Some(metrics) = self.rules.extract_from_str(&html) else {
            tracing::warn!(symbol, bytes = html.len(), "quote page has no text content");
            return ScrapedMetrics::unavailable();
        };
        if metrics.valuation_ratio.is_none() {
            tracing::warn!(symbol, "no extraction rule matched the valuation ratio");
        }
        if metrics.latest_earnings.is_none() {
            tracing::warn!(symbol, "no extraction rule matched the latest earnings");
        }
        metrics
    }

    async fn fetch_page(&self, symbol: &str) -> Result<String, CoreError> {
        tokio::time::timeout(self.timeout, self.pages.fetch_page(symbol))
            .await
            .map_err(|_| CoreError::Timeout {
                operation: format!("{} page fetch", self.pages.name()),
                symbol: symbol.to_string(),
                after: self.timeout,
            })?
    }
}
