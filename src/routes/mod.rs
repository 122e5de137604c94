pub mod health;
pub mod pose;
pub mod sessions;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::constants::MAX_BODY_SIZE;
use crate::middleware::request_id::request_id_middleware;
use crate::response::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(pose::router())
        .nest("/sessions", sessions::router())
        .nest("/health", health::router())
        .fallback(fallback_404)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn fallback_404() -> AppError {
    AppError::not_found("Not found")
}
