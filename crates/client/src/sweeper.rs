//! Periodic removal of old cache entries.

use std::time::Duration;

use titlefix_core::CacheDb;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Sweep once now, then every `interval`, removing entries older than `retention`.
///
/// The task runs until aborted. Failures are logged and the next tick tries again.
pub fn spawn_sweeper(cache: CacheDb, retention: Duration, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first tick completes immediately.
            ticker.tick().await;
            match cache.sweep(retention).await {
                Ok(deleted) => tracing::info!(deleted, ?retention, "cache sweep finished"),
                Err(e) => tracing::error!(error = %e, "cache sweep failed"),
            }
        }
    })
}
