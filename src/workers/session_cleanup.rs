use crate::sessions::SessionRegistry;

/// One sweep over the registry. Returns how many idle sessions were dropped.
pub async fn run(sessions: &SessionRegistry) -> usize {
    let evicted = sessions.evict_idle().await;
    if evicted > 0 {
        let remaining = sessions.len().await;
        tracing::info!(evicted, remaining, "idle sessions evicted");
    } else {
        tracing::debug!("no idle sessions");
    }
    evicted
}
