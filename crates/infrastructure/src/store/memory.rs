use async_trait::async_trait;
use custos_application::ports::{LogSubscriber, StorePort};
use custos_domain::{
    AdblockFilter, AppSetting, DomainError, LogEntry, LogUpdate, PaginatedRules, Rule, Stats,
    TrafficDataPoint,
};
use std::sync::RwLock;
use std::time::Duration;

/// Degraded store used when the SQLite file cannot be opened (§7a). Accepts
/// every write so the proxy keeps running, but never persists and reports
/// empty history — callers must not treat an empty `MemoryStore` result as
/// "genuinely no traffic".
#[derive(Default)]
pub struct MemoryStore {
    recent: RwLock<Vec<LogEntry>>,
}

const MAX_RECENT: usize = 200;

#[async_trait]
impl StorePort for MemoryStore {
    async fn add_log(&self, entry: LogEntry) -> Result<(), DomainError> {
        let mut recent = self.recent.write().expect("memory store lock poisoned");
        recent.insert(0, entry);
        recent.truncate(MAX_RECENT);
        Ok(())
    }

    async fn update_log(&self, _update: LogUpdate) -> Result<(), DomainError> {
        Ok(())
    }

    async fn add_traffic(&self, _upload: i64, _download: i64) -> Result<(), DomainError> {
        Ok(())
    }

    async fn get_recent_logs(&self, limit: u32) -> Result<Vec<LogEntry>, DomainError> {
        let recent = self.recent.read().expect("memory store lock poisoned");
        Ok(recent.iter().take(limit as usize).cloned().collect())
    }

    async fn get_traffic_history(&self, _window: Duration) -> Result<Vec<TrafficDataPoint>, DomainError> {
        Ok(Vec::new())
    }

    async fn get_stats(&self) -> Result<Stats, DomainError> {
        Ok(Stats::default())
    }

    async fn reset_data(&self) -> Result<(), DomainError> {
        self.recent.write().expect("memory store lock poisoned").clear();
        Ok(())
    }

    async fn get_rules(&self) -> Result<Vec<Rule>, DomainError> {
        Ok(Vec::new())
    }

    async fn get_rules_paginated(
        &self,
        page: u32,
        page_size: u32,
        _search: &str,
    ) -> Result<PaginatedRules, DomainError> {
        Ok(PaginatedRules {
            rules: Vec::new(),
            total: 0,
            page,
            page_size,
        })
    }

    async fn add_rule(&self, _rule: Rule) -> Result<i64, DomainError> {
        Err(DomainError::StoreUnavailable(
            "rule storage requires the persistent store".into(),
        ))
    }

    async fn delete_rule(&self, _id: i64) -> Result<(), DomainError> {
        Ok(())
    }

    async fn update_rule(&self, _rule: Rule) -> Result<(), DomainError> {
        Ok(())
    }

    async fn increment_rule_hit(&self, _id: i64, _domain: &str) -> Result<(), DomainError> {
        Ok(())
    }

    async fn get_adblock_filters(&self) -> Result<Vec<AdblockFilter>, DomainError> {
        Ok(Vec::new())
    }

    async fn add_adblock_filter(&self, _filter: AdblockFilter) -> Result<i64, DomainError> {
        Err(DomainError::StoreUnavailable(
            "adblock filter storage requires the persistent store".into(),
        ))
    }

    async fn delete_adblock_filter(&self, _id: i64) -> Result<(), DomainError> {
        Ok(())
    }

    async fn clear_adblock_filters(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn increment_adblock_hit(&self, _domain: &str) -> Result<(), DomainError> {
        Ok(())
    }

    async fn get_setting(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Ok(None)
    }

    async fn set_setting(&self, _key: &str, _value: &str) -> Result<(), DomainError> {
        Ok(())
    }

    async fn get_all_settings(&self) -> Result<Vec<AppSetting>, DomainError> {
        Ok(Vec::new())
    }

    fn subscribe(&self, _callback: LogSubscriber) {}
}
