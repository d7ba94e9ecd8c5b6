//! Periodic registration refresh.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::coordinator::CheckInCoordinator;

/// Background task refreshing the coordinator on a fixed interval
///
/// The first refresh runs immediately on start. The task stops on `stop` or
/// when the scheduler is dropped.
pub struct RefreshScheduler {
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl RefreshScheduler {
    /// Spawn the refresh loop on the current tokio runtime
    pub fn start(coordinator: Arc<CheckInCoordinator>, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = coordinator.refresh().await {
                    error!("Scheduled registration refresh failed: {e}");
                }
            }
        });
        info!("Registration refresh scheduled every {interval:?}");

        Self {
            handle: Some(handle),
            interval,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort the refresh loop; an in-flight refresh is dropped
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Registration refresh stopped");
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
