use std::net::SocketAddr;

use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use pose_backend::config::Config;
use pose_backend::logging::init_tracing;
use pose_backend::middleware::request_id::REQUEST_ID_HEADER;
use pose_backend::routes::build_router;
use pose_backend::services::pose_estimator::build_estimator;
use pose_backend::state::AppState;
use pose_backend::workers::spawn_sweeper;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// The API only ever returns JSON, so nothing may be framed, embedded or executed.
const STATIC_RESPONSE_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "no-referrer"),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'none'; frame-ancestors 'none'; base-uri 'none'",
    ),
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=31536000; includeSubDomains",
    ),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let _log_guard = init_tracing(&config.logging).expect("Failed to open log directory");
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting pose-backend");

    let estimator = build_estimator(&config.pose).expect("Invalid pose estimator configuration");
    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(&config, estimator);

    let sweeper = spawn_sweeper(
        state.sessions().clone(),
        &config.worker,
        shutdown_tx.subscribe(),
    );

    let app = with_edge_layers(build_router(state), &config);

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!(%addr, mock = config.pose.mock, "Listening");

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()))
        .await;
    if let Err(e) = served {
        tracing::error!(error = %e, "HTTP server stopped with an error");
    }

    // The server can also stop without a signal; make sure the sweeper hears it.
    let _ = shutdown_tx.send(());
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Session sweeper panicked");
        }
    }

    tracing::info!("Shutdown complete");
}

/// Wraps the API router in the layers that face browsers: CORS, tracing,
/// panic recovery and fixed security headers.
fn with_edge_layers(router: Router, config: &Config) -> Router {
    let mut app = router.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::new())
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.cors_origin)),
    );
    for (name, value) in STATIC_RESPONSE_HEADERS {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ));
    }
    app
}

/// `*` allows any origin; otherwise a comma-separated allow list.
fn cors_layer(origins: &str) -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, request_id.clone()])
        .expose_headers([request_id]);

    if origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .unwrap_or_else(|e| panic!("CORS_ORIGIN entry {origin:?} is not a valid header: {e}"))
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
