use std::sync::Arc;

use holdings_monitor_core::{
    services::cache::PortfolioCache, storage::manager::HoldingsLoader, PortfolioMonitor,
};
use tokio::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    /// Read side of the engine; handlers never touch anything else.
    pub cache: Arc<PortfolioCache>,
    pub stale_after: std::time::Duration,
    /// Kept for shutdown.
    pub monitor: Mutex<PortfolioMonitor>,
}

impl AppState {
    pub fn new(monitor: PortfolioMonitor) -> Self {
        Self {
            cache: monitor.cache(),
            stale_after: monitor.settings().stale_after,
            monitor: Mutex::new(monitor),
        }
    }
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Load holdings and wire the engine. Fails before anything is scheduled if
/// the holdings file is missing or malformed.
pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let holdings = HoldingsLoader::load_from_file(&config.holdings_path)?;
    tracing::info!(
        path = %config.holdings_path.display(),
        holdings = holdings.len(),
        "holdings loaded"
    );

    let monitor = PortfolioMonitor::new(holdings, config.engine.clone())?;
    Ok(Arc::new(AppState::new(monitor)))
}
