use custos_domain::config::DatabaseConfig;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Build base connection options shared by both pools.
fn base_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    SqliteConnectOptions::from_str(database_url).map(|o| {
        o.create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
    })
}

/// Per-connection PRAGMAs sized for this proxy's working set: `log_entries`,
/// `rules`, and `adblock_filters` are all small relative to a page cache
/// tuned for a DNS resolver's cache/query tables, so the defaults here stay
/// modest rather than claiming a large chunk of RAM a proxy doesn't need.
async fn apply_pragmas(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("PRAGMA cache_size = -16384")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA mmap_size = 67108864")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA temp_store = MEMORY")
        .execute(pool)
        .await?;
    Ok(())
}

/// Create the **write pool**. Traffic on this pool is bursty rather than a
/// steady per-query stream: one insert per accepted connection, one throttled
/// flush per open tunnel at most once a second (C6's CAS-gated flush), plus
/// occasional rule/adblock-filter CRUD and settings writes from the control
/// API. `cfg.write_pool_max_connections` stays small (default 2) because
/// SQLite WAL serialises writers at the file level regardless of pool size;
/// extra connections here only add contention, not throughput.
pub async fn create_write_pool(
    database_url: &str,
    cfg: &DatabaseConfig,
) -> Result<SqlitePool, sqlx::Error> {
    let options =
        base_options(database_url)?.busy_timeout(Duration::from_secs(cfg.write_busy_timeout_secs));

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.write_pool_max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(cfg.write_busy_timeout_secs))
        .connect_with(options)
        .await?;

    apply_pragmas(&pool).await?;

    sqlx::query(&format!(
        "PRAGMA wal_autocheckpoint = {}",
        cfg.wal_autocheckpoint
    ))
    .execute(&pool)
    .await?;

    // Migrations run once on the write pool only.
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;

    sqlx::query("PRAGMA optimize").execute(&pool).await?;

    Ok(pool)
}

/// Create the **read pool**, used by the control API's stats/logs/traffic
/// endpoints. SQLite WAL allows concurrent readers alongside the writer, so
/// splitting reads onto their own pool keeps a dashboard poll from competing
/// with an in-flight connection's log insert for a write-pool slot.
pub async fn create_read_pool(
    database_url: &str,
    cfg: &DatabaseConfig,
) -> Result<SqlitePool, sqlx::Error> {
    let options = base_options(database_url)?.busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.read_pool_max_connections)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    apply_pragmas(&pool).await?;

    Ok(pool)
}
