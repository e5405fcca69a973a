use serde::{Deserialize, Serialize};

/// Tuning for the filter/blocklist refresher (C9).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefresherConfig {
    /// Default hosts-file blocklist source, always included.
    #[serde(default = "default_blocklist_url")]
    pub default_blocklist_url: String,

    /// How long a cached filter-list body on disk remains valid before the
    /// refresher re-fetches it.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Seconds between scheduled refresh ticks. Default: 86 400 (24h).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Timeout for a single HTTP fetch of a remote filter/blocklist source.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_blocklist_url() -> String {
    "https://raw.githubusercontent.com/StevenBlack/hosts/master/hosts".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    86_400
}

fn default_interval_secs() -> u64 {
    86_400
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            default_blocklist_url: default_blocklist_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            interval_secs: default_interval_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}
