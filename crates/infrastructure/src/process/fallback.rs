use custos_application::ports::ProcessAttribution;

/// Process attribution requires `/proc`; on non-Linux hosts every lookup
/// reports unknown rather than failing the decision path (§4.3, §7e).
#[derive(Default)]
pub struct FallbackProcessAttributor;

impl FallbackProcessAttributor {
    pub fn new() -> Self {
        Self
    }

    pub async fn attribute(&self, _local_port: u16) -> ProcessAttribution {
        ("unknown".to_string(), 0)
    }
}
