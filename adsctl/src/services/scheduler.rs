//! Background daemon that periodically refreshes stale demographics.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::demographics::DemographicsService;

pub struct StaleRefreshDaemon {
    service: DemographicsService,
    interval: Duration,
    older_than: Duration,
}

impl StaleRefreshDaemon {
    pub fn new(service: DemographicsService, interval: Duration, older_than: Duration) -> Self {
        Self {
            service,
            interval,
            older_than,
        }
    }

    /// Run refresh-stale every `interval` until `shutdown` is cancelled. The first run starts
    /// immediately. A failed run is logged and the loop carries on.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval = ?self.interval,
            older_than = ?self.older_than,
            "Starting background demographics refresh"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Background demographics refresh shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.service.refresh_stale(self.older_than).await {
                        Ok(report) => info!(refreshed = report.refreshed, failed = report.failed, "Background demographics refresh run finished"),
                        Err(e) => error!("Background demographics refresh failed: {}", e),
                    }
                }
            }
        }
    }
}
