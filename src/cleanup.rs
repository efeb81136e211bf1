//! Periodic deletion of old chat records.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::config::CleanupSettings;
use crate::history::ChatStore;

/// Spawns the background task that purges chat records older than the
/// retention window on a fixed interval. Shares nothing with the
/// answering pipeline.
pub fn spawn(store: ChatStore, settings: CleanupSettings) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(settings.interval_hours.max(1) * 3600);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; wait a full period instead.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - chrono::Duration::days(settings.retention_days);
            match store.delete_older_than(cutoff).await {
                Ok(count) => tracing::info!("cleanup removed {} old chat records", count),
                Err(err) => tracing::warn!("cleanup failed: {}", err),
            }
        }
    })
}
