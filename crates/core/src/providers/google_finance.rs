use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::settings::EngineSettings;
use super::traits::PageProvider;

/// Google Finance quote pages (`/finance/quote/{SYMBOL}:{EXCHANGE}`).
///
/// - **Free**: public HTML, no API.
/// - **Unidentified clients** get a consent or reduced page, so every request
///   carries a browser `User-Agent`.
/// - **No schema**: what comes back is parsed heuristically by `MetricScraper`.
pub struct GoogleFinancePages {
    client: Client,
    base_url: String,
}

impl GoogleFinancePages {
    pub fn new(settings: &EngineSettings) -> Result<Self, CoreError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&settings.user_agent)
            .map_err(|e| CoreError::Config(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        // The scraper enforces its own deadline; this is a backstop for the
        // connection pool.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.scrape_timeout + Duration::from_secs(1))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.scrape_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Page URL for a scrape symbol such as `HDFCBANK:NSE`.
    pub fn page_url(&self, symbol: &str) -> String {
        format!("{}/{}", self.base_url, symbol.trim())
    }
}

#[async_trait]
impl PageProvider for GoogleFinancePages {
    fn name(&self) -> &str {
        "Google Finance"
    }

    async fn fetch_page(&self, symbol: &str) -> Result<String, CoreError> {
        let resp = self.client.get(self.page_url(symbol)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: "Google Finance".into(),
                message: format!("Quote page for {symbol} returned HTTP {status}"),
            });
        }

        Ok(resp.text().await?)
    }
}
