//! Per-session rep counters.
//!
//! Each workout session owns its own [`ExerciseDetector`] behind its own lock,
//! so concurrent callers on different sessions never share counting state and
//! calls within one session are applied one at a time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use crate::config::SessionConfig;
use crate::pose::detector::DetectorSnapshot;
use crate::pose::ExerciseDetector;

pub struct Session {
    id: String,
    detector: Mutex<ExerciseDetector>,
    created_at: DateTime<Utc>,
    last_active_ms: AtomicI64,
}

impl Session {
    fn new(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            detector: Mutex::new(ExerciseDetector::new()),
            created_at: now,
            last_active_ms: AtomicI64::new(now.timestamp_millis()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active_ms(&self) -> i64 {
        self.last_active_ms.load(Ordering::Relaxed)
    }

    /// Locks the detector for one analysis call and marks the session active.
    pub async fn lock(&self) -> MutexGuard<'_, ExerciseDetector> {
        let guard = self.detector.lock().await;
        self.touch();
        guard
    }

    /// Reads the detector state without marking the session active.
    pub async fn snapshot(&self) -> DetectorSnapshot {
        self.detector.lock().await.snapshot()
    }

    fn touch(&self) {
        self.last_active_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
    max_sessions: usize,
    idle_ttl_ms: i64,
}

impl SessionRegistry {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions: config.max_sessions.max(1),
            idle_ttl_ms: i64::try_from(config.idle_ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX),
        }
    }

    /// Returns the session for `id`, creating it when absent.
    pub async fn acquire(&self, id: &str) -> Arc<Session> {
        let mut sessions = self.sessions.lock().await;

        if let Some(existing) = sessions.get(id) {
            return existing.clone();
        }

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .filter(|(_, s)| !in_use(s))
                .min_by_key(|(_, s)| s.last_active_ms())
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => {
                    sessions.remove(&key);
                    tracing::info!(session_id = %key, "Evicted least recently active session");
                }
                None => tracing::warn!(
                    capacity = self.max_sessions,
                    "Every session is in use; admitting past capacity"
                ),
            }
        }

        let session = Arc::new(Session::new(id));
        sessions.insert(id.to_string(), session.clone());
        tracing::debug!(session_id = %id, "Session created");
        session
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.lock().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn evict_idle(&self) -> usize {
        self.evict_idle_at(Utc::now().timestamp_millis()).await
    }

    /// Drops sessions idle for longer than the TTL, skipping any still in use.
    pub async fn evict_idle_at(&self, now_ms: i64) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| {
            in_use(s) || now_ms.saturating_sub(s.last_active_ms()) <= self.idle_ttl_ms
        });
        before - sessions.len()
    }
}

/// A request still holds a handle besides the registry's own.
fn in_use(session: &Arc<Session>) -> bool {
    Arc::strong_count(session) > 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::testing::legs_at;
    use crate::pose::ExerciseKind;

    fn registry(max_sessions: usize) -> SessionRegistry {
        SessionRegistry::new(&SessionConfig {
            idle_ttl_secs: 60,
            max_sessions,
        })
    }

    #[tokio::test]
    async fn acquire_is_idempotent() {
        let reg = registry(10);
        let a = reg.acquire("alpha").await;
        let b = reg.acquire("alpha").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn sessions_count_independently() {
        let reg = registry(10);
        let a = reg.acquire("a").await;
        let b = reg.acquire("b").await;

        for angle in [170.0, 100.0, 170.0] {
            a.lock().await.analyze(&legs_at(angle), ExerciseKind::Squat);
        }
        b.lock().await.analyze(&legs_at(170.0), ExerciseKind::Squat);

        assert_eq!(a.lock().await.rep_count(), 1);
        assert_eq!(b.lock().await.rep_count(), 0);
    }

    #[tokio::test]
    async fn capacity_evicts_least_recent() {
        let reg = registry(2);
        let first = reg.acquire("first").await;
        first.last_active_ms.store(0, Ordering::Relaxed);
        drop(first);
        reg.acquire("second").await;
        reg.acquire("third").await;

        assert_eq!(reg.len().await, 2);
        assert!(reg.get("first").await.is_none());
        assert!(reg.get("third").await.is_some());
    }

    #[tokio::test]
    async fn capacity_never_evicts_a_held_session() {
        let reg = registry(1);
        let held = reg.acquire("a").await;
        for angle in [170.0, 100.0] {
            held.lock().await.analyze(&legs_at(angle), ExerciseKind::Squat);
        }

        let other = reg.acquire("b").await;
        held.lock().await.analyze(&legs_at(170.0), ExerciseKind::Squat);

        let again = reg.acquire("a").await;
        assert!(Arc::ptr_eq(&held, &again));
        assert_eq!(again.lock().await.rep_count(), 1);
        assert!(reg.get("b").await.is_some());
        drop(other);
    }

    #[tokio::test]
    async fn released_sessions_make_room_again() {
        let reg = registry(2);
        let a = reg.acquire("a").await;
        let b = reg.acquire("b").await;
        reg.acquire("c").await;
        assert_eq!(reg.len().await, 3);

        drop(a);
        drop(b);
        reg.acquire("d").await;
        assert_eq!(reg.len().await, 3);
        assert!(reg.get("d").await.is_some());
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let reg = registry(10);
        let stale = reg.acquire("stale").await;
        let stale_ts = stale.last_active_ms();
        drop(stale);
        let busy = reg.acquire("busy").await;

        let later = stale_ts + 61_000;
        let evicted = reg.evict_idle_at(later).await;
        assert_eq!(evicted, 1);
        assert!(reg.get("stale").await.is_none());
        // held by a caller, so kept even though idle
        assert!(reg.get("busy").await.is_some());
        drop(busy);
    }

    #[tokio::test]
    async fn remove_reports_presence() {
        let reg = registry(10);
        reg.acquire("x").await;
        assert!(reg.remove("x").await);
        assert!(!reg.remove("x").await);
        assert!(reg.is_empty().await);
    }
}
