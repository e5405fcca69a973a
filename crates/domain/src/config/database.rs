use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Maximum connections in the write pool (log inserts/updates, rule and
    /// setting mutations). SQLite WAL serialises writers at the file level,
    /// so more than a handful of connections does not increase throughput.
    /// Default: 2.
    #[serde(default = "default_write_pool_max_connections")]
    pub write_pool_max_connections: u32,

    /// Maximum connections in the read pool (recent logs, stats, rule
    /// pagination, traffic history). WAL allows concurrent readers.
    /// Default: 4.
    #[serde(default = "default_read_pool_max_connections")]
    pub read_pool_max_connections: u32,

    /// Seconds the write pool waits for a database lock before returning
    /// `SQLITE_BUSY`. Default: 30.
    #[serde(default = "default_write_busy_timeout_secs")]
    pub write_busy_timeout_secs: u64,

    /// Number of WAL pages that trigger an automatic checkpoint. Default:
    /// 4 000.
    #[serde(default = "default_wal_autocheckpoint")]
    pub wal_autocheckpoint: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            write_pool_max_connections: default_write_pool_max_connections(),
            read_pool_max_connections: default_read_pool_max_connections(),
            write_busy_timeout_secs: default_write_busy_timeout_secs(),
            wal_autocheckpoint: default_wal_autocheckpoint(),
        }
    }
}

fn default_db_path() -> String {
    "./custos.db".to_string()
}

fn default_write_pool_max_connections() -> u32 {
    2
}

fn default_read_pool_max_connections() -> u32 {
    4
}

fn default_write_busy_timeout_secs() -> u64 {
    30
}

fn default_wal_autocheckpoint() -> u32 {
    4_000
}
