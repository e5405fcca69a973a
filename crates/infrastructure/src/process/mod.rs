#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxProcessAttributor as PlatformProcessAttributor;

#[cfg(not(target_os = "linux"))]
mod fallback;
#[cfg(not(target_os = "linux"))]
pub use fallback::FallbackProcessAttributor as PlatformProcessAttributor;

use async_trait::async_trait;
use custos_application::ports::{ProcessAttribution, ProcessAttributorPort};

#[async_trait]
impl ProcessAttributorPort for PlatformProcessAttributor {
    async fn attribute(&self, local_port: u16) -> ProcessAttribution {
        self.attribute(local_port).await
    }
}
