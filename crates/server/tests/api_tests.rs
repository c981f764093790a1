// ═══════════════════════════════════════════════════════════════════
// API Tests — /portfolio read endpoint over the cache
// ═══════════════════════════════════════════════════════════════════

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Semaphore;
use tower::ServiceExt;

use holdings_monitor_core::errors::CoreError;
use holdings_monitor_core::extraction::rules::MetricRules;
use holdings_monitor_core::models::holding::Holding;
use holdings_monitor_core::models::record::{AggregateRecord, ScrapedMetrics};
use holdings_monitor_core::models::settings::EngineSettings;
use holdings_monitor_core::models::snapshot::{PortfolioSnapshot, Readiness};
use holdings_monitor_core::providers::traits::{PageProvider, QuoteProvider};
use holdings_monitor_core::PortfolioMonitor;
use holdings_monitor_server::api::app_router;
use holdings_monitor_server::error::panic_response;
use holdings_monitor_server::AppState;

const PAGE: &str = r#"<div><div>P/E ratio</div><div class="P6K39c">19.85</div></div>
<table><tr><td>Revenue</td><td class="QXDnM">874.31B</td></tr></table>"#;

// ── Helpers ─────────────────────────────────────────────────────────

struct Quotes {
    gate: Option<Arc<Semaphore>>,
}

#[async_trait]
impl QuoteProvider for Quotes {
    fn name(&self) -> &str {
        "TestQuotes"
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }
        match symbol {
            "HDFCBANK.NS" => Ok(1600.0),
            "INFY.NS" => Ok(1500.0),
            _ => Err(CoreError::Api {
                provider: "TestQuotes".into(),
                message: format!("unknown symbol {symbol}"),
            }),
        }
    }
}

struct Pages;

#[async_trait]
impl PageProvider for Pages {
    fn name(&self) -> &str {
        "TestPages"
    }

    async fn fetch_page(&self, _symbol: &str) -> Result<String, CoreError> {
        Ok(PAGE.to_string())
    }
}

fn holdings() -> Vec<Holding> {
    vec![
        Holding::new("HDFC Bank", "HDFCBANK.NS", "HDFCBANK:NSE", 50.0, 1490.0)
            .with_sector("Financials")
            .with_invested_amount(74500.0),
        Holding::new("Infosys", "INFY.NS", "INFY:NSE", 50.0, 1647.0),
        Holding::new("Delisted Co", "GONE.NS", "GONE:NSE", 5.0, 10.0),
    ]
}

fn settings() -> EngineSettings {
    EngineSettings {
        quote_timeout: Duration::from_secs(2),
        scrape_timeout: Duration::from_secs(2),
        refresh_interval: Duration::from_secs(3600),
        pacing_delay: Duration::from_millis(1),
        stale_after: Duration::from_secs(300),
        ..EngineSettings::default()
    }
}

fn state_with(quotes: Quotes) -> Arc<AppState> {
    let monitor = PortfolioMonitor::with_providers(
        holdings(),
        settings(),
        Box::new(quotes),
        Box::new(Pages),
        MetricRules::google_finance().unwrap(),
    )
    .unwrap();
    Arc::new(AppState::new(monitor))
}

fn state() -> Arc<AppState> {
    state_with(Quotes { gate: None })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn warm_up(state: &AppState) {
    let monitor = state.monitor.lock().await;
    monitor.scheduler().refresh_once().await.unwrap();
}

// ── Before the first snapshot ───────────────────────────────────────

mod cold {
    use super::*;

    #[tokio::test]
    async fn cold_cache_answers_202_with_placeholders() {
        let (status, body) = get_json(app_router(state()), "/portfolio").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "warming_up");
        assert_eq!(body["readiness"], "COLD");

        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["name"], "HDFC Bank");
        assert_eq!(data[0]["investedAmount"], 74500.0);
        for record in data {
            assert!(record["currentPrice"].is_null());
            assert!(record["presentValue"].is_null());
            assert!(record["gainLoss"].is_null());
            assert!(record["valuationRatio"].is_null());
            assert!(record["latestEarnings"].is_null());
        }
    }

    #[tokio::test]
    async fn first_cycle_in_flight_reports_warming() {
        let gate = Arc::new(Semaphore::new(0));
        let state = state_with(Quotes {
            gate: Some(Arc::clone(&gate)),
        });
        state.monitor.lock().await.start();

        for _ in 0..400 {
            if state.cache.readiness() == Readiness::Warming {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let (status, body) = get_json(app_router(state.clone()), "/portfolio").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["readiness"], "WARMING");

        gate.add_permits(3);
        state.monitor.lock().await.stop().await;
    }
}

// ── After the first snapshot ────────────────────────────────────────

mod warm {
    use super::*;

    #[tokio::test]
    async fn warm_cache_answers_200_from_cache() {
        let state = state();
        warm_up(&state).await;

        let (status, body) = get_json(app_router(state), "/portfolio").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "cache");
        assert_eq!(body["readiness"], "WARM");
        assert_eq!(body["generation"], 1);
        assert_eq!(body["stale"], false);
        assert!(body["capturedAt"].is_string());
        assert!(body["ageSeconds"].as_i64().unwrap() >= 0);

        let hdfc = &body["data"][0];
        assert_eq!(hdfc["sector"], "Financials");
        assert_eq!(hdfc["currentPrice"], 1600.0);
        assert_eq!(hdfc["presentValue"], 80000.0);
        assert_eq!(hdfc["gainLoss"], 5500.0);
        assert_eq!(hdfc["valuationRatio"], "19.85");
        assert_eq!(hdfc["latestEarnings"], "874.31B");
    }

    #[tokio::test]
    async fn unpriced_holding_keeps_its_slot() {
        let state = state();
        warm_up(&state).await;

        let (_, body) = get_json(app_router(state), "/portfolio").await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);

        let gone = &data[2];
        assert_eq!(gone["name"], "Delisted Co");
        assert!(gone["currentPrice"].is_null());
        assert!(gone["presentValue"].is_null());
        assert!(gone["gainLoss"].is_null());
        assert_eq!(gone["valuationRatio"], "19.85");
    }

    #[tokio::test]
    async fn api_prefixed_path_is_an_alias() {
        let state = state();
        warm_up(&state).await;

        let (a_status, a) = get_json(app_router(state.clone()), "/portfolio").await;
        let (b_status, b) = get_json(app_router(state), "/api/portfolio").await;
        assert_eq!(a_status, b_status);
        assert_eq!(a["data"], b["data"]);
        assert_eq!(a["generation"], b["generation"]);
    }

    #[tokio::test]
    async fn old_snapshot_is_flagged_stale() {
        let state = state();
        let records = holdings()
            .iter()
            .map(|h| AggregateRecord::derive(&h.clone().normalized(), Some(1.0), ScrapedMetrics::unavailable()))
            .collect();
        let captured = Utc::now() - chrono::Duration::hours(1);
        assert!(state.cache.set(PortfolioSnapshot::new(records, captured, 7)));

        let (status, body) = get_json(app_router(state), "/portfolio").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generation"], 7);
        assert_eq!(body["stale"], true);
        assert!(body["ageSeconds"].as_i64().unwrap() >= 3600);
    }
}

// ── Errors ──────────────────────────────────────────────────────────

mod errors {
    use super::*;

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = get_json(app_router(state()), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
        assert_eq!(body["message"], "Not Found");
    }

    #[tokio::test]
    async fn panic_becomes_generic_500() {
        let response = panic_response(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "Failed to fetch portfolio data");
    }
}
