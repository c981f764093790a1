use crate::models::holding::Holding;
use crate::models::record::AggregateRecord;
use super::quote_service::QuoteSource;
use super::scraper_service::MetricScraper;

/// Builds one holding's record from its price and scraped metrics.
pub struct Aggregator {
    quotes: QuoteSource,
    metrics: MetricScraper,
}

impl Aggregator {
    pub fn new(quotes: QuoteSource, metrics: MetricScraper) -> Self {
        Self { quotes, metrics }
    }

    /// Runs both lookups concurrently and waits for both; neither can cancel
    /// the other. Never fails: unavailable inputs become unavailable fields.
    pub async fn build_record(&self, holding: &Holding) -> AggregateRecord {
        let (price, metrics) = tokio::join!(
            self.quotes.fetch_price(&holding.quote_symbol),
            self.metrics.fetch_metrics(&holding.scrape_symbol),
        );
        AggregateRecord::derive(holding, price, metrics)
    }
}
