use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use holdings_monitor_core::models::{record::AggregateRecord, snapshot::Readiness};
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::error::{panic_response, ApiError, ApiResult};
use crate::main_lib::AppState;

/// Body of a `200` read: the latest committed snapshot.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse<'a> {
    pub source: &'static str,
    pub readiness: Readiness,
    pub generation: u64,
    pub captured_at: DateTime<Utc>,
    pub age_seconds: i64,
    pub stale: bool,
    pub data: &'a [AggregateRecord],
}

/// Body of a `202` read: no snapshot yet, placeholder records only.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmingResponse<'a> {
    pub status: &'static str,
    pub readiness: Readiness,
    pub data: &'a [AggregateRecord],
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/portfolio", get(get_portfolio))
        .route("/api/portfolio", get(get_portfolio))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Serve whatever the cache holds. Never waits on upstream I/O.
async fn get_portfolio(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let view = state.cache.get();
    let snapshot = &view.snapshot;

    if !view.readiness.is_warm() {
        let body = WarmingResponse {
            status: "warming_up",
            readiness: view.readiness,
            data: &snapshot.records,
        };
        return Ok((StatusCode::ACCEPTED, Json(body)).into_response());
    }

    let captured_at = snapshot
        .captured_at
        .ok_or_else(|| ApiError::Internal("warm snapshot has no capture time".into()))?;
    let now = Utc::now();
    let body = PortfolioResponse {
        source: "cache",
        readiness: view.readiness,
        generation: snapshot.generation,
        captured_at,
        age_seconds: (now - captured_at).num_seconds().max(0),
        stale: view.is_stale(now, state.stale_after),
        data: &snapshot.records,
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
