use crate::RefreshJob;
use std::sync::Arc;
use tracing::info;

/// Central orchestrator for background jobs. Only one is registered today
/// (the periodic filter refresh), kept as a builder so additional jobs can
/// be added the way the store's seed tasks were.
pub struct JobRunner {
    refresh: Option<RefreshJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self { refresh: None }
    }

    pub fn with_refresh(mut self, job: RefreshJob) -> Self {
        self.refresh = Some(job);
        self
    }

    pub async fn start(self) {
        info!("starting background job runner");

        if let Some(job) = self.refresh {
            Arc::new(job).start().await;
        }

        info!("all background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
