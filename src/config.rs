use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub cors_origin: String,
    pub logging: LoggingConfig,
    pub worker: WorkerConfig,
    pub pose: PoseConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` holds nothing usable.
    pub filter: String,
    /// Daily JSON log files are written here when set.
    pub file_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    pub is_leader: bool,
    /// Six-field cron expression (seconds first).
    pub sweep_schedule: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoseConfig {
    pub mock: bool,
    pub api_url: String,
    pub timeout_secs: u64,
    pub min_detection_confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub idle_ttl_secs: u64,
    pub max_sessions: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file_dir: None,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            is_leader: true,
            sweep_schedule: "0 * * * * *".to_string(),
        }
    }
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            mock: true,
            api_url: String::new(),
            timeout_secs: 10,
            min_detection_confidence: 0.5,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: 1800,
            max_sessions: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Missing or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let pose = PoseConfig::default();
        let session = SessionConfig::default();
        let worker = WorkerConfig::default();

        let file_dir = vars
            .flag("ENABLE_FILE_LOGS", false)
            .then(|| PathBuf::from(vars.text("LOG_DIR", "./logs")));

        Self {
            host: vars.parsed("HOST", IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: vars.parsed("PORT", 8000),
            cors_origin: vars.text("CORS_ORIGIN", "http://localhost:3000,http://localhost:3001"),
            logging: LoggingConfig {
                filter: vars.text("RUST_LOG", "info"),
                file_dir,
            },
            worker: WorkerConfig {
                is_leader: vars.flag("WORKER_LEADER", worker.is_leader),
                sweep_schedule: vars.text("SESSION_SWEEP_CRON", &worker.sweep_schedule),
            },
            pose: PoseConfig {
                mock: vars.flag("POSE_MOCK", pose.mock),
                api_url: vars.text("POSE_API_URL", &pose.api_url),
                timeout_secs: vars.parsed("POSE_TIMEOUT_SECS", pose.timeout_secs),
                min_detection_confidence: vars
                    .parsed("POSE_MIN_DETECTION_CONFIDENCE", pose.min_detection_confidence)
                    .clamp(0.0, 1.0),
            },
            session: SessionConfig {
                idle_ttl_secs: vars.parsed("SESSION_IDLE_TTL_SECS", session.idle_ttl_secs),
                max_sessions: vars.parsed("SESSION_MAX", session.max_sessions).max(1),
            },
        }
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn text(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.raw(key) else {
            return default;
        };
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "unparsable setting, using default");
            default
        })
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.raw(key) else {
            return default;
        };
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!(key, value = %raw, "unrecognised flag, using default");
                default
            }
        }
    }
}
