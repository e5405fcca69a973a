use async_trait::async_trait;
use custos_domain::{
    AdblockFilter, AppSetting, DomainError, LogEntry, LogUpdate, PaginatedRules, Rule, Stats,
    TrafficDataPoint,
};
use std::sync::Arc;
use std::time::Duration;

/// A callback invoked whenever a log row is created or updated. Dispatched
/// off the write path (see `StorePort::subscribe`); must never block it.
pub type LogSubscriber = Arc<dyn Fn(LogEntry) + Send + Sync>;

/// Application-layer port for the persistent log/stats/rules/settings store
/// (C5). The SQLite-backed implementation lives in infrastructure; a
/// degraded in-memory implementation backs it when the file-backed store
/// cannot be opened (§7a).
#[async_trait]
pub trait StorePort: Send + Sync {
    async fn add_log(&self, entry: LogEntry) -> Result<(), DomainError>;
    async fn update_log(&self, update: LogUpdate) -> Result<(), DomainError>;
    async fn add_traffic(&self, upload: i64, download: i64) -> Result<(), DomainError>;

    async fn get_recent_logs(&self, limit: u32) -> Result<Vec<LogEntry>, DomainError>;
    async fn get_traffic_history(
        &self,
        window: Duration,
    ) -> Result<Vec<TrafficDataPoint>, DomainError>;
    async fn get_stats(&self) -> Result<Stats, DomainError>;
    async fn reset_data(&self) -> Result<(), DomainError>;

    async fn get_rules(&self) -> Result<Vec<Rule>, DomainError>;
    async fn get_rules_paginated(
        &self,
        page: u32,
        page_size: u32,
        search: &str,
    ) -> Result<PaginatedRules, DomainError>;
    async fn add_rule(&self, rule: Rule) -> Result<i64, DomainError>;
    async fn delete_rule(&self, id: i64) -> Result<(), DomainError>;
    async fn update_rule(&self, rule: Rule) -> Result<(), DomainError>;
    async fn increment_rule_hit(&self, id: i64, domain: &str) -> Result<(), DomainError>;

    async fn get_adblock_filters(&self) -> Result<Vec<AdblockFilter>, DomainError>;
    async fn add_adblock_filter(&self, filter: AdblockFilter) -> Result<i64, DomainError>;
    async fn delete_adblock_filter(&self, id: i64) -> Result<(), DomainError>;
    async fn clear_adblock_filters(&self) -> Result<(), DomainError>;
    async fn increment_adblock_hit(&self, domain: &str) -> Result<(), DomainError>;

    async fn get_setting(&self, key: &str) -> Result<Option<String>, DomainError>;
    async fn set_setting(&self, key: &str, value: &str) -> Result<(), DomainError>;
    async fn get_all_settings(&self) -> Result<Vec<AppSetting>, DomainError>;

    /// Registers a fan-out subscriber; called on every `add_log`/`update_log`.
    fn subscribe(&self, callback: LogSubscriber);
}
