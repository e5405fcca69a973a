use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopDomain {
    pub domain: String,
    pub bytes: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_upload: i64,
    pub total_download: i64,
    pub top_domains: Vec<TopDomain>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficDataPoint {
    /// Bucket label, `HH:MM` in local time.
    pub name: String,
    pub upload: i64,
    pub download: i64,
}
