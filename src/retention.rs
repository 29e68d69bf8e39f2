//! Retention manager for cleaning up old uptime logs.
//!
//! Uptime logs otherwise grow without bound; the sweeper deletes rows older
//! than the configured number of days. Set retention to 0 to disable.

use crate::db::Store;

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const SWEEP_INTERVAL_SECS: u64 = 3600;

/// Manager for deleting uptime logs past the retention period.
pub struct RetentionManager {
    store: Arc<Store>,
    retention_days: i64,
    stop: Arc<Mutex<Option<tokio::sync::broadcast::Sender<()>>>>,
}

impl RetentionManager {
    pub fn new(store: Arc<Store>, retention_days: i64) -> Self {
        Self {
            store,
            retention_days,
            stop: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the retention background task. No-op when retention is disabled.
    pub fn start(&self) {
        if self.retention_days <= 0 {
            tracing::info!("RetentionManager: log retention disabled");
            return;
        }

        let store = self.store.clone();
        let retention_days = self.retention_days;
        let stop = self.stop.clone();

        tokio::spawn(async move {
            let (tx, _) = tokio::sync::broadcast::channel(1);
            {
                let mut stop_guard = stop.lock().await;
                *stop_guard = Some(tx.clone());
            }

            let mut rx = tx.subscribe();
            let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

            loop {
                tokio::select! {
                    _ = rx.recv() => break,
                    _ = interval.tick() => {
                        sweep_logs(&store, retention_days);
                    }
                }
            }
        });
    }

    /// Stop the retention manager.
    pub async fn stop(&self) {
        let stop = self.stop.lock().await;
        if let Some(tx) = stop.as_ref() {
            let _ = tx.send(());
        }
    }
}

fn sweep_logs(store: &Store, retention_days: i64) {
    let cutoff = Utc::now() - ChronoDuration::days(retention_days);

    match store.delete_uptime_logs_before(cutoff) {
        Ok(0) => {}
        Ok(deleted) => {
            tracing::info!("RetentionManager: deleted {} uptime logs", deleted);
        }
        Err(e) => {
            tracing::error!("RetentionManager: failed to delete uptime logs: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ComponentStatus;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sweep_deletes_only_expired_logs() {
        let tmp = NamedTempFile::new().unwrap();
        let store = Store::new(tmp.path()).unwrap();
        let project = store.add_project("Acme", "acme").unwrap();
        let component = store
            .add_component(project.id, "API", ComponentStatus::Operational, 0)
            .unwrap();
        let check = store
            .add_uptime_check(component.id, project.id, "API health")
            .unwrap();

        let now = Utc::now();
        store
            .add_uptime_logs(
                check.id,
                &[
                    (true, Some(10.0), now - ChronoDuration::days(400)),
                    (true, Some(10.0), now - ChronoDuration::days(10)),
                ],
            )
            .unwrap();

        sweep_logs(&store, 365);

        let totals = store
            .project_uptime_totals(project.id, now - ChronoDuration::days(500))
            .unwrap();
        assert_eq!(totals.total_checks, 1);
    }

    #[tokio::test]
    async fn test_manager_sweeps_on_start_and_stops() {
        let tmp = NamedTempFile::new().unwrap();
        let store = Arc::new(Store::new(tmp.path()).unwrap());
        let project = store.add_project("Acme", "acme").unwrap();
        let component = store
            .add_component(project.id, "API", ComponentStatus::Operational, 0)
            .unwrap();
        let check = store
            .add_uptime_check(component.id, project.id, "API health")
            .unwrap();

        let now = Utc::now();
        store
            .add_uptime_logs(check.id, &[(true, Some(10.0), now - ChronoDuration::days(400))])
            .unwrap();

        let manager = RetentionManager::new(store.clone(), 365);
        manager.start();

        // The first interval tick fires immediately
        tokio::time::sleep(Duration::from_millis(100)).await;
        manager.stop().await;

        let totals = store
            .project_uptime_totals(project.id, now - ChronoDuration::days(500))
            .unwrap();
        assert_eq!(totals.total_checks, 0);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let tmp = NamedTempFile::new().unwrap();
        let store = Arc::new(Store::new(tmp.path()).unwrap());

        let manager = RetentionManager::new(store, 0);
        manager.start(); // disabled, spawns nothing
        manager.stop().await;
    }
}
