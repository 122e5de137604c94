use std::sync::Arc;

use axum::Router;
use pose_backend::config::{Config, SessionConfig, WorkerConfig};
use pose_backend::routes::build_router;
use pose_backend::services::pose_estimator::{MockPoseEstimator, PoseEstimator};
use pose_backend::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
}

fn test_config(max_sessions: usize) -> Config {
    // No process env, so parallel tests never see each other's settings.
    let mut config = Config::from_lookup(|_| None);
    config.worker = WorkerConfig {
        is_leader: false,
        ..WorkerConfig::default()
    };
    config.session = SessionConfig {
        idle_ttl_secs: 1800,
        max_sessions,
    };
    config
}

fn spawn(config: Config, estimator: Arc<dyn PoseEstimator>) -> TestApp {
    let state = AppState::new(&config, estimator);
    let app = build_router(state.clone());

    TestApp { app, state, config }
}

pub fn spawn_test_app() -> TestApp {
    spawn(test_config(100), Arc::new(MockPoseEstimator))
}

pub fn spawn_test_app_with_estimator(estimator: Arc<dyn PoseEstimator>) -> TestApp {
    spawn(test_config(100), estimator)
}

pub fn spawn_test_app_with_capacity(max_sessions: usize) -> TestApp {
    spawn(test_config(max_sessions), Arc::new(MockPoseEstimator))
}
