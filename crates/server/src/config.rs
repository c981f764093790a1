use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use holdings_monitor_core::models::settings::EngineSettings;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub holdings_path: PathBuf,
    pub log_format: String,
    pub engine: EngineSettings,
}

impl Config {
    /// Read `HM_*` variables (after loading a `.env` file if present).
    /// A variable that is set but unparsable is an error, not a silent default.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("HM_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3001".to_string())
            .parse()
            .context("Invalid HM_LISTEN_ADDR")?;
        let holdings_path = std::env::var("HM_HOLDINGS_PATH")
            .unwrap_or_else(|_| "./data.json".into())
            .into();
        let log_format = std::env::var("HM_LOG_FORMAT").unwrap_or_else(|_| "text".into());

        let defaults = EngineSettings::default();
        let refresh_interval = env_duration(
            "HM_REFRESH_INTERVAL_SECS",
            defaults.refresh_interval,
            Duration::from_secs,
        )?;
        let engine = EngineSettings {
            quote_timeout: env_duration(
                "HM_QUOTE_TIMEOUT_MS",
                defaults.quote_timeout,
                Duration::from_millis,
            )?,
            scrape_timeout: env_duration(
                "HM_SCRAPE_TIMEOUT_MS",
                defaults.scrape_timeout,
                Duration::from_millis,
            )?,
            refresh_interval,
            pacing_delay: env_duration("HM_PACING_MS", defaults.pacing_delay, Duration::from_millis)?,
            stale_after: env_duration(
                "HM_STALE_AFTER_SECS",
                refresh_interval * 5,
                Duration::from_secs,
            )?,
            scrape_base_url: std::env::var("HM_SCRAPE_BASE_URL")
                .unwrap_or(defaults.scrape_base_url),
            user_agent: defaults.user_agent,
        };

        if engine.refresh_interval.is_zero() {
            anyhow::bail!("HM_REFRESH_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            listen_addr,
            holdings_path,
            log_format,
            engine,
        })
    }
}

fn env_duration(
    name: &str,
    default: Duration,
    unit: fn(u64) -> Duration,
) -> anyhow::Result<Duration> {
    match std::env::var(name) {
        Ok(raw) => {
            let value: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {name}: {raw:?}"))?;
            Ok(unit(value))
        }
        Err(_) => Ok(default),
    }
}
