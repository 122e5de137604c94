use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::constants::SERVICE_NAME;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(status))
        .route("/live", get(|| async { StatusCode::OK }))
        .route("/ready", get(|| async { StatusCode::OK }))
        .route("/metrics", get(stage_metrics))
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    let active_sessions = state.sessions().len().await;
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "estimator": state.estimator().name(),
        "sessions": active_sessions,
        "uptimeSecs": state.uptime_secs(),
    }))
}

async fn stage_metrics(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "operations": state.metrics().snapshot() }))
}
