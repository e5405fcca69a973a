use async_trait::async_trait;
use custos_domain::DomainError;

/// Best-effort OS integration the core consumes but does not depend on for
/// correctness (§6/§7e): setting the host's system-wide SOCKS proxy, and
/// toggling launch-on-startup. A platform that doesn't support one of these
/// returns `DomainError::UnsupportedPlatform` rather than panicking.
#[async_trait]
pub trait SystemIntegrationPort: Send + Sync {
    async fn set_system_proxy(&self, enabled: bool, port: u16) -> Result<(), DomainError>;
    async fn set_startup(&self, enabled: bool) -> Result<(), DomainError>;
    async fn is_startup_enabled(&self) -> Result<bool, DomainError>;
}
