use adblock::lists::{FilterSet, ParseOptions};
use adblock::request::Request;
use adblock::Engine;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use custos_application::ports::{AdblockEnginePort, FilterDecision};
use custos_domain::DomainError;
use std::sync::Arc;

/// Hot-swappable wrapper around `adblock::Engine` (C3). The live engine is
/// held behind an `ArcSwap` rather than an `RwLock`: a `check` on the hot
/// path only ever does a lock-free pointer load, and a `reload` from the
/// filter refresher never blocks a connection mid-decision (§5.1).
pub struct AdblockMatcher {
    live: ArcSwap<Engine>,
}

impl AdblockMatcher {
    pub fn new() -> Self {
        Self {
            live: ArcSwap::from_pointee(Engine::new(true)),
        }
    }

    fn build_engine(rules: &str) -> Engine {
        let mut filter_set = FilterSet::new(false);
        filter_set.add_filter_list(rules, ParseOptions::default());
        Engine::from_filter_set(filter_set, true)
    }
}

impl Default for AdblockMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdblockEnginePort for AdblockMatcher {
    fn check(&self, url: &str, source_url: &str, resource_type: &str) -> FilterDecision {
        let engine = self.live.load();
        let request = match Request::new(url, source_url, resource_type) {
            Ok(r) => r,
            // A malformed synthetic URL is a bug in the caller, not a reason
            // to block legitimate traffic.
            Err(_) => return FilterDecision::Allow,
        };

        if engine.check_network_request(&request).matched {
            FilterDecision::Block
        } else {
            FilterDecision::Allow
        }
    }

    async fn reload(&self, rules: String) -> Result<(), DomainError> {
        let engine = tokio::task::spawn_blocking(move || Self::build_engine(&rules))
            .await
            .map_err(|e| DomainError::IoError(e.to_string()))?;
        self.live.store(Arc::new(engine));
        Ok(())
    }
}
