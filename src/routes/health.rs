use axum::extract::State;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response::json_ok;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthStatus {
    status: &'static str,
    uptime_seconds: u64,
    active_sessions: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    started_at: DateTime<Utc>,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    json_ok(HealthStatus {
        status: "ok",
        uptime_seconds: state.uptime_seconds(),
        active_sessions: state.sessions().active_count(),
    })
}

pub async fn live() -> impl IntoResponse {
    json_ok("alive")
}

pub async fn info(State(state): State<AppState>) -> impl IntoResponse {
    json_ok(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        started_at: DateTime::<Utc>::from(state.started_at_system()),
    })
}
