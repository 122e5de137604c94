//! Background maintenance driven by a cron schedule.
//!
//! Only the leader instance sweeps; followers skip the scheduler entirely.

pub mod session_cleanup;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::config::WorkerConfig;
use crate::sessions::SessionRegistry;

const SWEEP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

/// Evicts idle sessions on `WorkerConfig::sweep_schedule`.
pub struct SessionSweeper {
    sessions: Arc<SessionRegistry>,
    schedule: String,
}

impl SessionSweeper {
    pub fn new(sessions: Arc<SessionRegistry>, config: &WorkerConfig) -> Self {
        Self {
            sessions,
            schedule: config.sweep_schedule.clone(),
        }
    }

    pub fn schedule(&self) -> &str {
        &self.schedule
    }

    /// A tick that fires while the previous sweep is still running is dropped.
    fn job(&self) -> Result<Job, WorkerError> {
        let sessions = self.sessions.clone();
        let running = Arc::new(Mutex::new(()));

        let job = Job::new_async(self.schedule.as_str(), move |_id, _scheduler| {
            let sessions = sessions.clone();
            let running = running.clone();
            Box::pin(async move {
                let Ok(_sweep) = running.try_lock() else {
                    tracing::warn!("session sweep skipped, previous sweep still running");
                    return;
                };
                let sweep = session_cleanup::run(&sessions);
                if tokio::time::timeout(SWEEP_TIMEOUT, sweep).await.is_err() {
                    tracing::error!(
                        timeout_secs = SWEEP_TIMEOUT.as_secs(),
                        "session sweep timed out"
                    );
                }
            })
        })?;
        Ok(job)
    }

    /// Schedules the sweep and keeps it running until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), WorkerError> {
        let mut scheduler = JobScheduler::new().await?;
        scheduler.add(self.job()?).await?;
        scheduler.start().await?;
        tracing::info!(schedule = %self.schedule, "session sweeper started");

        let _ = shutdown.recv().await;

        scheduler.shutdown().await?;
        tracing::info!("session sweeper stopped");
        Ok(())
    }
}

/// Spawns the sweeper when this instance is the worker leader.
pub fn spawn_sweeper(
    sessions: Arc<SessionRegistry>,
    config: &WorkerConfig,
    shutdown: broadcast::Receiver<()>,
) -> Option<tokio::task::JoinHandle<()>> {
    if !config.is_leader {
        tracing::info!("not the worker leader, session sweeper disabled");
        return None;
    }

    let sweeper = SessionSweeper::new(sessions, config);
    Some(tokio::spawn(async move {
        if let Err(e) = sweeper.run(shutdown).await {
            tracing::error!(error = %e, "session sweeper failed");
        }
    }))
}
