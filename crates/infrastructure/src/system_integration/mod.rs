use async_trait::async_trait;
use custos_application::ports::SystemIntegrationPort;
use custos_domain::DomainError;

/// Best-effort OS integration (§6/§7e). The proxy's correctness never
/// depends on this succeeding; a platform with no wiring for one of these
/// operations reports `UnsupportedPlatform` rather than panicking.
pub struct LinuxSystemIntegration;

impl LinuxSystemIntegration {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinuxSystemIntegration {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemIntegrationPort for LinuxSystemIntegration {
    async fn set_system_proxy(&self, _enabled: bool, _port: u16) -> Result<(), DomainError> {
        // GNOME/KDE expose this via gsettings/kwriteconfig, which vary enough
        // across desktop environments that wiring one in is out of scope;
        // the SOCKS5 server itself is unaffected by whether the OS-wide
        // proxy setting is toggled.
        Err(DomainError::UnsupportedPlatform(
            "system-wide proxy toggling is not wired for this platform".into(),
        ))
    }

    async fn set_startup(&self, _enabled: bool) -> Result<(), DomainError> {
        Err(DomainError::UnsupportedPlatform(
            "launch-on-startup is not wired for this platform".into(),
        ))
    }

    async fn is_startup_enabled(&self) -> Result<bool, DomainError> {
        Ok(false)
    }
}
