pub mod errors;
pub mod extraction;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use errors::CoreError;
use extraction::rules::MetricRules;
use models::{
    holding::Holding,
    settings::EngineSettings,
    snapshot::{CacheView, Readiness},
};
use providers::{
    google_finance::GoogleFinancePages,
    traits::{PageProvider, QuoteProvider},
    yahoo_finance::YahooFinanceProvider,
};
use services::{
    aggregator::Aggregator,
    cache::PortfolioCache,
    quote_service::QuoteSource,
    scheduler::{RefreshScheduler, SchedulerHandle},
    scraper_service::MetricScraper,
};

/// Main entry point for the Holdings Monitor core library.
///
/// Owns the holdings list, the cache and the refresh scheduler. Construct it
/// once at startup, call [`PortfolioMonitor::start`] inside a Tokio runtime,
/// and hand [`PortfolioMonitor::cache`] to the read path.
#[must_use]
pub struct PortfolioMonitor {
    holdings: Arc<[Holding]>,
    settings: EngineSettings,
    cache: Arc<PortfolioCache>,
    aggregator: Arc<Aggregator>,
    handle: Option<SchedulerHandle>,
}

impl std::fmt::Debug for PortfolioMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioMonitor")
            .field("holdings", &self.holdings.len())
            .field("readiness", &self.cache.readiness())
            .field("generation", &self.cache.generation())
            .field("running", &self.is_running())
            .finish()
    }
}

impl PortfolioMonitor {
    /// Wire the production upstreams: Yahoo Finance quotes and Google Finance
    /// quote pages with the stock extraction rules.
    pub fn new(holdings: Vec<Holding>, settings: EngineSettings) -> Result<Self, CoreError> {
        let quotes = YahooFinanceProvider::new()?;
        let pages = GoogleFinancePages::new(&settings)?;
        Self::with_providers(
            holdings,
            settings,
            Box::new(quotes),
            Box::new(pages),
            MetricRules::google_finance()?,
        )
    }

    /// Wire arbitrary upstreams. Holdings are validated here; an empty or
    /// invalid list is rejected before anything is scheduled.
    pub fn with_providers(
        holdings: Vec<Holding>,
        settings: EngineSettings,
        quotes: Box<dyn QuoteProvider>,
        pages: Box<dyn PageProvider>,
        rules: MetricRules,
    ) -> Result<Self, CoreError> {
        if holdings.is_empty() {
            return Err(CoreError::Config("holdings list is empty".into()));
        }
        // tokio's interval panics on a zero period.
        if settings.refresh_interval.is_zero() {
            return Err(CoreError::Config("refresh interval must be greater than zero".into()));
        }
        let holdings = holdings
            .into_iter()
            .enumerate()
            .map(|(index, holding)| {
                holding.validate(index)?;
                Ok(holding.normalized())
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let aggregator = Aggregator::new(
            QuoteSource::new(quotes, settings.quote_timeout),
            MetricScraper::new(pages, rules, settings.scrape_timeout),
        );
        let cache = PortfolioCache::new(&holdings);

        Ok(Self {
            holdings: holdings.into(),
            settings,
            cache: Arc::new(cache),
            aggregator: Arc::new(aggregator),
            handle: None,
        })
    }

    /// Start the background refresh loop. No-op if already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.handle = Some(self.scheduler().start());
    }

    /// Stop the background refresh loop and wait for it to exit.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop().await;
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(SchedulerHandle::is_running)
    }

    /// A scheduler sharing this monitor's cache, for driving cycles by hand.
    pub fn scheduler(&self) -> RefreshScheduler {
        RefreshScheduler::new(
            Arc::clone(&self.aggregator),
            Arc::clone(&self.cache),
            Arc::clone(&self.holdings),
            self.settings.clone(),
        )
    }

    /// Shared read handle for the request path.
    #[must_use]
    pub fn cache(&self) -> Arc<PortfolioCache> {
        Arc::clone(&self.cache)
    }

    #[must_use]
    pub fn view(&self) -> CacheView {
        self.cache.get()
    }

    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.cache.readiness()
    }

    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}
