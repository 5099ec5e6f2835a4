//! Periodic product refresh.
//!
//! Runs the `ProductUpdater` on a fixed period in a background task. A failed
//! run is logged and the next one happens on schedule.

use std::time::Duration;

use caltrack_client::{ProductUpdater, RefreshReport};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Run one refresh, logging the outcome.
pub async fn run_once(updater: &ProductUpdater) -> Option<RefreshReport> {
    match updater.update().await {
        Ok(report) => {
            tracing::info!(
                pages = report.pages,
                skipped_pages = report.skipped_pages,
                updated = report.updated,
                "scheduled product refresh completed"
            );
            Some(report)
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduled product refresh failed");
            None
        }
    }
}

/// Spawn the refresh loop. The first run happens one `period` from now.
pub fn spawn(updater: ProductUpdater, period: Duration) -> JoinHandle<()> {
    tracing::info!(period_secs = period.as_secs(), batch_size = updater.batch_size(), "product refresh scheduled");

    tokio::spawn(async move {
        let Some(start) = Instant::now().checked_add(period) else {
            tracing::error!(period_secs = period.as_secs(), "refresh period out of range, scheduled refresh disabled");
            return;
        };
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_once(&updater).await;
        }
    })
}
