use async_trait::async_trait;
use custos_domain::DomainError;

/// The outcome of an adblock check against a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Block,
    Allow,
}

/// Application-layer port for the ad-blocking matcher (C3).
///
/// The implementation lives in the infrastructure layer and is injected at
/// wiring time. `check` is synchronous and lock-free on the hot path — the
/// live matcher is reached through an `ArcSwap`; a reader snapshots it once
/// per decision and is unaffected by a concurrent `reload`. Only `reload`
/// touches the network/disk and is async.
#[async_trait]
pub trait AdblockEnginePort: Send + Sync {
    /// Check whether `url` (built as `http://<domain>`) would be blocked by
    /// the currently live rule set.
    fn check(&self, url: &str, source_url: &str, resource_type: &str) -> FilterDecision;

    /// Parse `rules` (concatenated filter-list bodies) into a fresh matcher
    /// and atomically swap it in. The previous matcher stays valid for any
    /// reader that already snapshotted it.
    async fn reload(&self, rules: String) -> Result<(), DomainError>;
}
