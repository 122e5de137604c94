use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::metrics::MetricsRegistry;
use crate::services::pose_estimator::{EstimatorHandle, PoseEstimator};
use crate::sessions::SessionRegistry;

/// Shared by every handler; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Shared>,
}

struct Shared {
    sessions: Arc<SessionRegistry>,
    estimator: EstimatorHandle,
    metrics: MetricsRegistry,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: &Config, estimator: Arc<dyn PoseEstimator>) -> Self {
        Self {
            inner: Arc::new(Shared {
                sessions: Arc::new(SessionRegistry::new(&config.session)),
                estimator: EstimatorHandle::new(estimator),
                metrics: MetricsRegistry::new(),
                started_at: Instant::now(),
            }),
        }
    }

    /// Also handed to the idle-session sweeper.
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.inner.sessions
    }

    pub fn estimator(&self) -> &EstimatorHandle {
        &self.inner.estimator
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.inner.metrics
    }

    pub fn uptime_secs(&self) -> u64 {
        self.inner.started_at.elapsed().as_secs()
    }
}
