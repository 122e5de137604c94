//! Lock-free counters for the stages of frame processing, exposed on
//! `/health/metrics`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Upper bounds (microseconds) of the latency histogram; the last bucket is open.
const BUCKET_BOUNDS_US: [u64; 5] = [1_000, 5_000, 20_000, 100_000, 500_000];
/// Value reported for a percentile that lands in each bucket.
const BUCKET_REPORTED_US: [f64; 6] = [500.0, 3_000.0, 12_500.0, 60_000.0, 300_000.0, 1_000_000.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    DecodeFrame,
    EstimatePose,
    AnalyzeFrame,
    ResetDetector,
}

impl Operation {
    const COUNT: usize = 4;

    pub const ALL: [Operation; Self::COUNT] = [
        Self::DecodeFrame,
        Self::EstimatePose,
        Self::AnalyzeFrame,
        Self::ResetDetector,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DecodeFrame => "decode_frame",
            Self::EstimatePose => "estimate_pose",
            Self::AnalyzeFrame => "analyze_frame",
            Self::ResetDetector => "reset_detector",
        }
    }
}

#[derive(Default)]
struct Stage {
    calls: AtomicU64,
    errors: AtomicU64,
    busy_us: AtomicU64,
    last_call_ms: AtomicI64,
    histogram: [AtomicU64; BUCKET_REPORTED_US.len()],
}

impl Stage {
    fn observe(&self, elapsed: Duration, failed: bool) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.busy_us.fetch_add(micros, Ordering::Relaxed);
        if failed {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        let bucket = BUCKET_BOUNDS_US.partition_point(|&bound| bound < micros);
        self.histogram[bucket].fetch_add(1, Ordering::Relaxed);
        self.last_call_ms
            .store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Reported latency at quantile `q` (0..=1), or 0 before the first call.
    fn quantile(&self, q: f64) -> f64 {
        let counts = self.histogram.each_ref().map(|c| c.load(Ordering::Relaxed));
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let rank = (q * total as f64).ceil().max(1.0) as u64;
        let mut seen = 0;
        for (count, reported) in counts.iter().zip(BUCKET_REPORTED_US) {
            seen += count;
            if seen >= rank {
                return reported;
            }
        }
        BUCKET_REPORTED_US[BUCKET_REPORTED_US.len() - 1]
    }

    fn report(&self) -> StageReport {
        StageReport {
            call_count: self.calls.load(Ordering::Relaxed),
            error_count: self.errors.load(Ordering::Relaxed),
            total_latency_us: self.busy_us.load(Ordering::Relaxed),
            last_called_at: self.last_call_ms.load(Ordering::Relaxed),
            p50_us: self.quantile(0.50),
            p95_us: self.quantile(0.95),
            p99_us: self.quantile(0.99),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub call_count: u64,
    pub error_count: u64,
    pub total_latency_us: u64,
    /// Unix millis of the latest call, 0 if never called.
    pub last_called_at: i64,
    pub p50_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
}

#[derive(Default)]
pub struct MetricsRegistry {
    stages: [Stage; Operation::COUNT],
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, op: Operation, elapsed: Duration, failed: bool) {
        self.stages[op as usize].observe(elapsed, failed);
    }

    pub fn snapshot(&self) -> BTreeMap<&'static str, StageReport> {
        Operation::ALL
            .into_iter()
            .map(|op| (op.as_str(), self.stages[op as usize].report()))
            .collect()
    }
}

/// Evaluates `$block` (a `Result`) and records its duration and outcome under `$op`.
macro_rules! track_operation {
    ($registry:expr, $op:expr, $block:expr) => {{
        let started = std::time::Instant::now();
        let outcome = $block;
        $registry.record($op, started.elapsed(), outcome.is_err());
        outcome
    }};
}

pub(crate) use track_operation;
