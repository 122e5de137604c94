use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pose::detector::DetectorSnapshot;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::validation::validate_session_id;

pub fn router() -> Router<AppState> {
    Router::new().route("/:id", get(get_session).delete(delete_session))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    session_id: String,
    #[serde(flatten)]
    detector: DetectorSnapshot,
    created_at: DateTime<Utc>,
    last_active_at: i64,
}

fn checked_id(id: &str) -> Result<(), AppError> {
    validate_session_id(id).map_err(|msg| AppError::bad_request("INVALID_SESSION_ID", msg))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    checked_id(&id)?;
    let session = state
        .sessions()
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    Ok(ok(SessionView {
        session_id: session.id().to_string(),
        detector: session.snapshot().await,
        created_at: session.created_at(),
        last_active_at: session.last_active_ms(),
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    checked_id(&id)?;
    if !state.sessions().remove(&id).await {
        return Err(AppError::not_found("Session not found"));
    }
    tracing::info!(session_id = %id, "Session deleted");
    Ok(ok(serde_json::json!({
        "sessionId": id,
        "deleted": true,
    })))
}
