use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SCRAPE_BASE_URL: &str = "https://www.google.com/finance/quote";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Tunables for the aggregation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Deadline for a single quote lookup.
    pub quote_timeout: Duration,

    /// Deadline for fetching one quote page.
    pub scrape_timeout: Duration,

    /// Delay between consecutive refresh cycles.
    pub refresh_interval: Duration,

    /// Stagger between the start of consecutive holdings within a cycle.
    pub pacing_delay: Duration,

    /// Snapshots older than this are reported as stale.
    pub stale_after: Duration,

    /// Quote page URL prefix; the scrape symbol is appended as a path segment.
    pub scrape_base_url: String,

    /// Browser-like identification sent with page requests.
    pub user_agent: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let refresh_interval = Duration::from_secs(60);
        Self {
            quote_timeout: Duration::from_secs(5),
            scrape_timeout: Duration::from_secs(5),
            refresh_interval,
            pacing_delay: Duration::from_millis(200),
            stale_after: refresh_interval * 5,
            scrape_base_url: DEFAULT_SCRAPE_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl EngineSettings {
    /// Worst-case wall time of one cycle over `holdings` positions.
    pub fn cycle_budget(&self, holdings: usize) -> Duration {
        let stagger = self.pacing_delay * holdings.saturating_sub(1) as u32;
        stagger + self.quote_timeout.max(self.scrape_timeout)
    }
}
