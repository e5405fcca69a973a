use custos_infrastructure::FilterRefresher;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Periodic trigger for the filter/blocklist refresher (C9). The refresher
/// itself is single-flight guarded, so a periodic tick racing a manual
/// control-API trigger just waits its turn rather than double-fetching.
pub struct RefreshJob {
    refresher: Arc<FilterRefresher>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl RefreshJob {
    pub fn new(refresher: Arc<FilterRefresher>) -> Self {
        Self {
            refresher,
            interval_secs: 86400,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "starting filter refresh job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("refresh job: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        info!("refresh job: running scheduled refresh");
                        self.refresher.refresh().await;
                    }
                }
            }
        });
    }
}
