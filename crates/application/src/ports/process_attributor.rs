use async_trait::async_trait;

/// A resolved process attribution: `(name, pid)`. Lookup failures are
/// represented as `("unknown".to_string(), 0)` rather than an error, since
/// attribution only feeds a log field and must never fail the decision path
/// (§4.3).
pub type ProcessAttribution = (String, u32);

/// Application-layer port for mapping a local TCP source port to the owning
/// process (C4).
#[async_trait]
pub trait ProcessAttributorPort: Send + Sync {
    async fn attribute(&self, local_port: u16) -> ProcessAttribution;
}
