use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "pose-backend";
const KEPT_LOG_FILES: usize = 14;

/// Installs the global subscriber: compact lines on stdout plus, when
/// `file_dir` is set, daily JSON files written off the request path.
///
/// The returned guard flushes the file writer on drop, so the caller keeps it
/// alive for the life of the process. Calling this again after a subscriber
/// is installed leaves the first one in place.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>, InitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let (file_layer, guard) = match &config.file_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("log")
                .max_log_files(KEPT_LOG_FILES)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(true))
        .with(file_layer)
        .try_init();

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(guard)
}
