use async_trait::async_trait;
use custos_application::ports::{
    AdblockEnginePort, BlocklistPort, FilterDecision, LogSubscriber, ProcessAttribution,
    ProcessAttributorPort, StorePort,
};
use custos_domain::{
    AdblockFilter, AppSetting, DomainError, LogEntry, LogUpdate, PaginatedRules, Rule, Stats,
    TrafficDataPoint,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// In-memory `StorePort` double. Tracks every call that matters for the
/// decision-engine scenarios: logged rows, rule/adblock hit counts, and the
/// rolled-up upload/download totals a flush would otherwise update.
#[derive(Default)]
pub struct MockStore {
    pub logs: RwLock<Vec<LogEntry>>,
    pub rules: RwLock<Vec<Rule>>,
    pub rule_hits: AtomicUsize,
    pub adblock_hits: AtomicUsize,
    pub total_upload: AtomicI64,
    pub total_download: AtomicI64,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules: RwLock::new(rules),
            ..Default::default()
        }
    }
}

#[async_trait]
impl StorePort for MockStore {
    async fn add_log(&self, entry: LogEntry) -> Result<(), DomainError> {
        self.logs.write().unwrap().push(entry);
        Ok(())
    }

    async fn update_log(&self, update: LogUpdate) -> Result<(), DomainError> {
        let mut logs = self.logs.write().unwrap();
        if let Some(entry) = logs.iter_mut().find(|e| e.id == update.id) {
            if let Some(sent) = update.bytes_sent {
                entry.bytes_sent = sent;
            }
            if let Some(recv) = update.bytes_recv {
                entry.bytes_recv = recv;
            }
            if let Some(status) = update.status {
                entry.status = status;
            }
            if let Some(reason) = update.reason {
                entry.reason = Some(reason);
            }
        }
        Ok(())
    }

    async fn add_traffic(&self, upload: i64, download: i64) -> Result<(), DomainError> {
        self.total_upload.fetch_add(upload, Ordering::SeqCst);
        self.total_download.fetch_add(download, Ordering::SeqCst);
        Ok(())
    }

    async fn get_recent_logs(&self, limit: u32) -> Result<Vec<LogEntry>, DomainError> {
        Ok(self.logs.read().unwrap().iter().take(limit as usize).cloned().collect())
    }

    async fn get_traffic_history(&self, _window: Duration) -> Result<Vec<TrafficDataPoint>, DomainError> {
        Ok(Vec::new())
    }

    async fn get_stats(&self) -> Result<Stats, DomainError> {
        Err(DomainError::StoreUnavailable("mock store has no stats rollup".into()))
    }

    async fn reset_data(&self) -> Result<(), DomainError> {
        self.logs.write().unwrap().clear();
        Ok(())
    }

    async fn get_rules(&self) -> Result<Vec<Rule>, DomainError> {
        Ok(self.rules.read().unwrap().clone())
    }

    async fn get_rules_paginated(
        &self,
        _page: u32,
        _page_size: u32,
        _search: &str,
    ) -> Result<PaginatedRules, DomainError> {
        let rules = self.rules.read().unwrap().clone();
        Ok(PaginatedRules {
            total: rules.len() as u64,
            rules,
            page: 1,
            page_size: 50,
        })
    }

    async fn add_rule(&self, rule: Rule) -> Result<i64, DomainError> {
        let id = rule.id;
        self.rules.write().unwrap().push(rule);
        Ok(id)
    }

    async fn delete_rule(&self, id: i64) -> Result<(), DomainError> {
        self.rules.write().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn update_rule(&self, rule: Rule) -> Result<(), DomainError> {
        let mut rules = self.rules.write().unwrap();
        if let Some(existing) = rules.iter_mut().find(|r| r.id == rule.id) {
            *existing = rule;
        }
        Ok(())
    }

    async fn increment_rule_hit(&self, _id: i64, _domain: &str) -> Result<(), DomainError> {
        self.rule_hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_adblock_filters(&self) -> Result<Vec<AdblockFilter>, DomainError> {
        Ok(Vec::new())
    }

    async fn add_adblock_filter(&self, _filter: AdblockFilter) -> Result<i64, DomainError> {
        Ok(1)
    }

    async fn delete_adblock_filter(&self, _id: i64) -> Result<(), DomainError> {
        Ok(())
    }

    async fn clear_adblock_filters(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn increment_adblock_hit(&self, _domain: &str) -> Result<(), DomainError> {
        self.adblock_hits.fetch_add(1, Ordering::SeqCst);
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

/// Exact-match blocklist double.
#[derive(Default)]
pub struct MockBlocklist {
    domains: RwLock<HashSet<String>>,
}

impl MockBlocklist {
    pub fn with_domains(domains: &[&str]) -> Self {
        Self {
            domains: RwLock::new(domains.iter().map(|d| d.to_string()).collect()),
        }
    }
}

#[async_trait]
impl BlocklistPort for MockBlocklist {
    fn set_sources(&self, _sources: Vec<String>) {}

    async fn load(&self) -> Result<(), DomainError> {
        Ok(())
    }

    fn is_blocked(&self, domain: &str) -> bool {
        self.domains.read().unwrap().contains(domain)
    }
}

/// Adblock double: blocks any url containing one of `blocked_substrings`.
/// `reload` atomically replaces the substring list, mirroring the real
/// matcher's hot-swap without needing the real `adblock::Engine`.
#[derive(Default)]
pub struct MockAdblock {
    blocked_substrings: RwLock<Vec<String>>,
}

impl MockAdblock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocking(substrings: &[&str]) -> Self {
        Self {
            blocked_substrings: RwLock::new(substrings.iter().map(|s| s.to_string()).collect()),
        }
    }
}

#[async_trait]
impl AdblockEnginePort for MockAdblock {
    fn check(&self, url: &str, _source_url: &str, _resource_type: &str) -> FilterDecision {
        let blocked = self.blocked_substrings.read().unwrap();
        if blocked.iter().any(|s| url.contains(s.as_str())) {
            FilterDecision::Block
        } else {
            FilterDecision::Allow
        }
    }

    async fn reload(&self, rules: String) -> Result<(), DomainError> {
        *self.blocked_substrings.write().unwrap() = rules.lines().map(|s| s.to_string()).collect();
        Ok(())
    }
}

/// Process attributor double that counts how many times it was invoked, so
/// tests can assert the loopback bypass never reaches it.
#[derive(Default)]
pub struct MockProcessAttributor {
    pub calls: AtomicUsize,
}

impl MockProcessAttributor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessAttributorPort for MockProcessAttributor {
    async fn attribute(&self, _local_port: u16) -> ProcessAttribution {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ("test-process".to_string(), 4242)
    }
}
