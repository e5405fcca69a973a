use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdblockFilter {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub enabled: bool,
    pub last_updated: Option<DateTime<Utc>>,
}
