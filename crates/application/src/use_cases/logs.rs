use crate::ports::StorePort;
use custos_domain::{DomainError, LogEntry, Stats, TrafficDataPoint};
use std::sync::Arc;
use std::time::Duration;

const MAX_LIMIT: u32 = 1_000;

pub struct GetRecentLogsUseCase {
    store: Arc<dyn StorePort>,
}

impl GetRecentLogsUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, limit: u32) -> Result<Vec<LogEntry>, DomainError> {
        let limit = limit.clamp(1, MAX_LIMIT);
        self.store.get_recent_logs(limit).await
    }
}

pub struct GetStatsUseCase {
    store: Arc<dyn StorePort>,
}

impl GetStatsUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> Result<Stats, DomainError> {
        self.store.get_stats().await
    }
}

pub struct GetTrafficHistoryUseCase {
    store: Arc<dyn StorePort>,
}

impl GetTrafficHistoryUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, minutes: u64) -> Result<Vec<TrafficDataPoint>, DomainError> {
        self.store
            .get_traffic_history(Duration::from_secs(minutes * 60))
            .await
    }
}

pub struct ResetDataUseCase {
    store: Arc<dyn StorePort>,
}

impl ResetDataUseCase {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> Result<(), DomainError> {
        self.store.reset_data().await
    }
}
