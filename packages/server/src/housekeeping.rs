//! Periodic removal of finished jobs.

use std::sync::Arc;
use std::time::Duration;

use product_scraper::ProductStore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Delete completed and failed jobs that finished more than `retention` ago.
pub async fn sweep<S: ProductStore>(store: &S, retention: chrono::Duration) -> usize {
    match store.delete_jobs_older_than(retention).await {
        Ok(0) => {
            debug!("Housekeeping found no expired jobs");
            0
        }
        Ok(removed) => {
            info!(removed, retention_days = retention.num_days(), "Removed expired jobs");
            removed
        }
        Err(e) => {
            warn!(error = %e, "Housekeeping sweep failed");
            0
        }
    }
}

/// Run [`sweep`] every `period` until the returned task is aborted.
pub fn spawn<S: ProductStore + 'static>(
    store: Arc<S>,
    retention: chrono::Duration,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // Skip first immediate tick

        loop {
            interval.tick().await;
            sweep(store.as_ref(), retention).await;
        }
    })
}
