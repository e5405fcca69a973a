use async_trait::async_trait;
use custos_domain::DomainError;

/// Application-layer port for the domain blocklist (C2): a hot, read-mostly
/// set of exact domain names compiled from hosts-file-format sources.
#[async_trait]
pub trait BlocklistPort: Send + Sync {
    /// Replace the list of sources (URLs or file paths) consulted on the
    /// next `load()`. Does not itself trigger a reload.
    fn set_sources(&self, sources: Vec<String>);

    /// Fetch/read every configured source and atomically swap in the freshly
    /// parsed set. Per-source failures are logged and skipped.
    async fn load(&self) -> Result<(), DomainError>;

    /// `domain`, trailing dot stripped, is checked for exact membership.
    fn is_blocked(&self, domain: &str) -> bool;
}
