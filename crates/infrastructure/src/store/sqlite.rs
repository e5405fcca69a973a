use async_trait::async_trait;
use chrono::Utc;
use custos_application::ports::{LogSubscriber, StorePort};
use custos_domain::{
    AdblockFilter, AppSetting, BlockReason, DomainError, LogEntry, LogStatus, LogType,
    LogUpdate, PaginatedRules, Protocol, Rule, RuleSource, RuleType, SettingKey, Stats,
    TopDomain, TrafficDataPoint,
};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::sync::RwLock as StdRwLock;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::warn;

/// Default hosts-format blocklist the store seeds its `rules` table from on
/// first open (§4.6). Mirrors the reference implementation's single default
/// source.
const DEFAULT_SEED_URL: &str = "https://raw.githubusercontent.com/StevenBlack/hosts/master/hosts";
const SEED_CHUNK_SIZE: usize = 500;

/// SQLite-backed implementation of `StorePort`. Holds a write pool (log
/// inserts/updates, rule/setting/filter mutations) and a read pool (recent
/// logs, stats, pagination) per the teacher's split-pool pattern, plus an
/// in-memory cache of the rules table that is invalidated on any mutation.
pub struct SqliteStore {
    write_pool: SqlitePool,
    read_pool: SqlitePool,
    rules_cache: RwLock<Option<Vec<Rule>>>,
    subscribers: StdRwLock<Vec<LogSubscriber>>,
}

impl SqliteStore {
    pub fn new(write_pool: SqlitePool, read_pool: SqlitePool) -> Self {
        Self {
            write_pool,
            read_pool,
            rules_cache: RwLock::new(None),
            subscribers: StdRwLock::new(Vec::new()),
        }
    }

    /// Seeds the settings table with documented defaults for any key not yet
    /// present, and the rules table with the default hosts blocklist (BLOCK,
    /// source=default), deduplicated against what's already there. Runs once
    /// at startup; never blocks construction — the caller spawns this.
    pub async fn seed(&self) {
        for key in SettingKey::all() {
            if let Ok(None) = self.get_setting(key.as_str()).await {
                if let Err(e) = self.set_setting(key.as_str(), key.default_value()).await {
                    warn!(error = %e, key = key.as_str(), "failed to seed default setting");
                }
            }
        }

        if let Err(e) = self.seed_default_rules().await {
            warn!(error = %e, "failed to seed default blocklist rules");
        }
    }

    async fn seed_default_rules(&self) -> Result<(), DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rules WHERE source = 'default'")
            .fetch_one(&self.read_pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DomainError::IoError(e.to_string()))?;
        let body = client
            .get(DEFAULT_SEED_URL)
            .send()
            .await
            .map_err(|e| DomainError::IoError(e.to_string()))?
            .text()
            .await
            .map_err(|e| DomainError::IoError(e.to_string()))?;

        let mut domains: Vec<String> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let token = line.split_whitespace().last().unwrap_or("");
            let domain = token.trim_end_matches('.');
            if domain.contains('.') && seen.insert(domain.to_string()) {
                domains.push(domain.to_string());
            }
        }

        for chunk in domains.chunks(SEED_CHUNK_SIZE) {
            let mut tx = self.write_pool.begin().await?;
            for domain in chunk {
                sqlx::query(
                    "INSERT INTO rules (rule_type, pattern, enabled, source) VALUES ('BLOCK', ?, 1, 'default')",
                )
                .bind(domain)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
        }

        self.invalidate_rules_cache().await;
        Ok(())
    }

    async fn invalidate_rules_cache(&self) {
        *self.rules_cache.write().await = None;
    }

    fn dispatch(&self, entry: &LogEntry) {
        let subs = self.subscribers.read().expect("subscribers lock poisoned");
        for sub in subs.iter() {
            let sub = sub.clone();
            let entry = entry.clone();
            tokio::spawn(async move {
                sub(entry);
            });
        }
    }

    fn row_to_log_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LogEntry, DomainError> {
        let status_str: String = row.try_get("status")?;
        let protocol_str: String = row.try_get("protocol")?;
        let log_type_str: String = row.try_get("log_type")?;
        let reason_str: Option<String> = row.try_get("reason")?;
        let timestamp_str: String = row.try_get("timestamp")?;

        Ok(LogEntry {
            id: row.try_get("id")?,
            timestamp: timestamp_str
                .parse()
                .unwrap_or_else(|_| Utc::now()),
            log_type: LogType::from_str(&log_type_str).unwrap_or(LogType::Proxy),
            domain: row.try_get("domain")?,
            src_ip: row.try_get("src_ip")?,
            dst_ip: row.try_get("dst_ip")?,
            dst_port: row.try_get::<i64, _>("dst_port")? as u16,
            protocol: Protocol::from_str(&protocol_str).unwrap_or(Protocol::Tcp),
            process_name: row.try_get("process_name")?,
            process_id: row.try_get::<i64, _>("process_id")? as u32,
            bytes_sent: row.try_get("bytes_sent")?,
            bytes_recv: row.try_get("bytes_recv")?,
            status: LogStatus::from_str(&status_str).unwrap_or(LogStatus::Allowed),
            reason: reason_str.as_deref().and_then(BlockReason::from_str),
            latency_ms: row.try_get("latency_ms")?,
        })
    }

    fn row_to_rule(row: &sqlx::sqlite::SqliteRow) -> Result<Rule, DomainError> {
        let rule_type_str: String = row.try_get("rule_type")?;
        let source_str: String = row.try_get("source")?;
        Ok(Rule {
            id: row.try_get("id")?,
            rule_type: RuleType::from_str(&rule_type_str).unwrap_or(RuleType::Block),
            pattern: row.try_get("pattern")?,
            enabled: row.try_get::<i64, _>("enabled")? != 0,
            source: RuleSource::from_str(&source_str).unwrap_or(RuleSource::Custom),
        })
    }
}

#[async_trait]
impl StorePort for SqliteStore {
    async fn add_log(&self, entry: LogEntry) -> Result<(), DomainError> {
        let mut tx = self.write_pool.begin().await?;

        sqlx::query(
            "INSERT INTO log_entries
                (id, timestamp, log_type, domain, src_ip, dst_ip, dst_port, protocol,
                 process_name, process_id, bytes_sent, bytes_recv, status, reason, latency_ms)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(entry.timestamp.to_rfc3339())
        .bind(entry.log_type.as_str())
        .bind(&entry.domain)
        .bind(&entry.src_ip)
        .bind(&entry.dst_ip)
        .bind(entry.dst_port as i64)
        .bind(entry.protocol.as_str())
        .bind(&entry.process_name)
        .bind(entry.process_id as i64)
        .bind(entry.bytes_sent)
        .bind(entry.bytes_recv)
        .bind(entry.status.as_str())
        .bind(entry.reason.map(|r| r.as_str()))
        .bind(entry.latency_ms)
        .execute(&mut *tx)
        .await?;

        if entry.bytes_sent > 0 || entry.bytes_recv > 0 {
            sqlx::query(
                "UPDATE traffic_stats_models SET total_upload = total_upload + ?, total_download = total_download + ? WHERE id = 'global'",
            )
            .bind(entry.bytes_sent)
            .bind(entry.bytes_recv)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.dispatch(&entry);
        Ok(())
    }

    async fn update_log(&self, update: LogUpdate) -> Result<(), DomainError> {
        // Column-mask update: only the Some(..) fields are touched, so a
        // partial flush can never clobber an unrelated column with a zero
        // value (§3.1).
        let mut sets: Vec<String> = Vec::new();
        if update.bytes_sent.is_some() {
            sets.push("bytes_sent = ?".to_string());
        }
        if update.bytes_recv.is_some() {
            sets.push("bytes_recv = ?".to_string());
        }
        if update.status.is_some() {
            sets.push("status = ?".to_string());
        }
        if update.reason.is_some() {
            sets.push("reason = ?".to_string());
        }
        if sets.is_empty() {
            return Ok(());
        }

        let sql = format!("UPDATE log_entries SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(v) = update.bytes_sent {
            query = query.bind(v);
        }
        if let Some(v) = update.bytes_recv {
            query = query.bind(v);
        }
        if let Some(v) = update.status {
            query = query.bind(v.as_str());
        }
        if let Some(v) = update.reason {
            query = query.bind(v.as_str());
        }
        query = query.bind(&update.id);
        query.execute(&self.write_pool).await?;

        if let Ok(Some(entry)) = self.get_log_by_id(&update.id).await {
            self.dispatch(&entry);
        }

        Ok(())
    }

    async fn add_traffic(&self, upload: i64, download: i64) -> Result<(), DomainError> {
        if upload == 0 && download == 0 {
            return Ok(());
        }
        sqlx::query(
            "UPDATE traffic_stats_models SET total_upload = total_upload + ?, total_download = total_download + ? WHERE id = 'global'",
        )
        .bind(upload)
        .bind(download)
        .execute(&self.write_pool)
        .await?;
        Ok(())
    }

    async fn get_recent_logs(&self, limit: u32) -> Result<Vec<LogEntry>, DomainError> {
        let rows = sqlx::query("SELECT * FROM log_entries ORDER BY timestamp DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.read_pool)
            .await?;
        rows.iter().map(Self::row_to_log_entry).collect()
    }

    async fn get_traffic_history(
        &self,
        window: Duration,
    ) -> Result<Vec<TrafficDataPoint>, DomainError> {
        let threshold = Utc::now() - chrono::Duration::from_std(window).unwrap_or_default();
        let rows = sqlx::query(
            "SELECT strftime('%H:%M', timestamp, 'localtime') AS bucket,
                    SUM(bytes_sent) AS upload, SUM(bytes_recv) AS download
             FROM log_entries
             WHERE timestamp > ?
             GROUP BY bucket
             ORDER BY bucket ASC",
        )
        .bind(threshold.to_rfc3339())
        .fetch_all(&self.read_pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(TrafficDataPoint {
                    name: row.try_get("bucket")?,
                    upload: row.try_get::<Option<i64>, _>("upload")?.unwrap_or(0),
                    download: row.try_get::<Option<i64>, _>("download")?.unwrap_or(0),
                })
            })
            .collect()
    }

    async fn get_stats(&self) -> Result<Stats, DomainError> {
        let row = sqlx::query(
            "SELECT total_upload, total_download FROM traffic_stats_models WHERE id = 'global'",
        )
        .fetch_optional(&self.read_pool)
        .await?;

        let (total_upload, total_download) = match row {
            Some(r) => (r.try_get("total_upload")?, r.try_get("total_download")?),
            None => (0, 0),
        };

        let top_rows = sqlx::query(
            "SELECT COALESCE(NULLIF(domain, ''), dst_ip) AS target,
                    SUM(bytes_sent + bytes_recv) AS total_bytes
             FROM log_entries
             GROUP BY target
             ORDER BY total_bytes DESC
             LIMIT 5",
        )
        .fetch_all(&self.read_pool)
        .await?;

        let top_domains = top_rows
            .iter()
            .map(|row| {
                Ok(TopDomain {
                    domain: row.try_get("target")?,
                    bytes: row.try_get::<Option<i64>, _>("total_bytes")?.unwrap_or(0),
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Stats {
            total_upload,
            total_download,
            top_domains,
        })
    }

    async fn reset_data(&self) -> Result<(), DomainError> {
        let mut tx = self.write_pool.begin().await?;
        sqlx::query("DELETE FROM log_entries").execute(&mut *tx).await?;
        sqlx::query(
            "UPDATE traffic_stats_models SET total_upload = 0, total_download = 0 WHERE id = 'global'",
        )
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_rules(&self) -> Result<Vec<Rule>, DomainError> {
        if let Some(cached) = self.rules_cache.read().await.clone() {
            return Ok(cached);
        }

        let rows = sqlx::query("SELECT * FROM rules ORDER BY source ASC, id DESC")
            .fetch_all(&self.read_pool)
            .await?;
        let rules = rows
            .iter()
            .map(Self::row_to_rule)
            .collect::<Result<Vec<_>, DomainError>>()?;

        *self.rules_cache.write().await = Some(rules.clone());
        Ok(rules)
    }

    async fn get_rules_paginated(
        &self,
        page: u32,
        page_size: u32,
        search: &str,
    ) -> Result<PaginatedRules, DomainError> {
        let offset = (page.saturating_sub(1)) as i64 * page_size as i64;
        let like = format!("%{search}%");

        let (rows, total): (Vec<sqlx::sqlite::SqliteRow>, i64) = if search.is_empty() {
            let rows = sqlx::query(
                "SELECT * FROM rules ORDER BY source ASC, id DESC LIMIT ? OFFSET ?",
            )
            .bind(page_size as i64)
            .bind(offset)
            .fetch_all(&self.read_pool)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rules")
                .fetch_one(&self.read_pool)
                .await?;
            (rows, total)
        } else {
            let rows = sqlx::query(
                "SELECT * FROM rules WHERE pattern LIKE ? ORDER BY source ASC, id DESC LIMIT ? OFFSET ?",
            )
            .bind(&like)
            .bind(page_size as i64)
            .bind(offset)
            .fetch_all(&self.read_pool)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rules WHERE pattern LIKE ?")
                .bind(&like)
                .fetch_one(&self.read_pool)
                .await?;
            (rows, total)
        };

        let rules = rows
            .iter()
            .map(Self::row_to_rule)
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(PaginatedRules {
            rules,
            total: total as u64,
            page,
            page_size,
        })
    }

    async fn add_rule(&self, rule: Rule) -> Result<i64, DomainError> {
        let id = sqlx::query(
            "INSERT INTO rules (rule_type, pattern, enabled, source) VALUES (?, ?, ?, ?)",
        )
        .bind(rule.rule_type.as_str())
        .bind(&rule.pattern)
        .bind(rule.enabled as i64)
        .bind(rule.source.as_str())
        .execute(&self.write_pool)
        .await?
        .last_insert_rowid();

        self.invalidate_rules_cache().await;
        Ok(id)
    }

    async fn delete_rule(&self, id: i64) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM rules WHERE id = ?")
            .bind(id)
            .execute(&self.write_pool)
            .await?;
        self.invalidate_rules_cache().await;
        Ok(())
    }

    async fn update_rule(&self, rule: Rule) -> Result<(), DomainError> {
        // `enabled` is always applied; pattern/type/source only when
        // non-empty, so a toggle-only update doesn't need to resend them.
        sqlx::query(
            "UPDATE rules SET enabled = ?,
                pattern = CASE WHEN ? != '' THEN ? ELSE pattern END,
                rule_type = CASE WHEN ? != '' THEN ? ELSE rule_type END,
                source = CASE WHEN ? != '' THEN ? ELSE source END
             WHERE id = ?",
        )
        .bind(rule.enabled as i64)
        .bind(&rule.pattern)
        .bind(&rule.pattern)
        .bind(rule.rule_type.as_str())
        .bind(rule.rule_type.as_str())
        .bind(rule.source.as_str())
        .bind(rule.source.as_str())
        .bind(rule.id)
        .execute(&self.write_pool)
        .await?;
        self.invalidate_rules_cache().await;
        Ok(())
    }

    async fn increment_rule_hit(&self, id: i64, domain: &str) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO rule_hits (rule_id, domain, hit_count, last_hit_at) VALUES (?, ?, 1, ?)
             ON CONFLICT(rule_id, domain) DO UPDATE SET
                hit_count = hit_count + 1, last_hit_at = excluded.last_hit_at",
        )
        .bind(id)
        .bind(domain)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.write_pool)
        .await?;
        Ok(())
    }

    async fn get_adblock_filters(&self) -> Result<Vec<AdblockFilter>, DomainError> {
        let rows = sqlx::query("SELECT * FROM adblock_filters ORDER BY id ASC")
            .fetch_all(&self.read_pool)
            .await?;
        rows.iter()
            .map(|row| {
                let last_updated: Option<String> = row.try_get("last_updated")?;
                Ok(AdblockFilter {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    url: row.try_get("url")?,
                    enabled: row.try_get::<i64, _>("enabled")? != 0,
                    last_updated: last_updated.and_then(|s| s.parse().ok()),
                })
            })
            .collect()
    }

    async fn add_adblock_filter(&self, filter: AdblockFilter) -> Result<i64, DomainError> {
        let id = sqlx::query(
            "INSERT INTO adblock_filters (name, url, enabled, last_updated) VALUES (?, ?, ?, ?)",
        )
        .bind(&filter.name)
        .bind(&filter.url)
        .bind(filter.enabled as i64)
        .bind(filter.last_updated.map(|t| t.to_rfc3339()))
        .execute(&self.write_pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    async fn delete_adblock_filter(&self, id: i64) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM adblock_filters WHERE id = ?")
            .bind(id)
            .execute(&self.write_pool)
            .await?;
        Ok(())
    }

    async fn clear_adblock_filters(&self) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM adblock_filters")
            .execute(&self.write_pool)
            .await?;
        Ok(())
    }

    async fn increment_adblock_hit(&self, domain: &str) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO adblock_hits (domain, hit_count, last_hit_at) VALUES (?, 1, ?)
             ON CONFLICT(domain) DO UPDATE SET
                hit_count = hit_count + 1, last_hit_at = excluded.last_hit_at",
        )
        .bind(domain)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.write_pool)
        .await?;
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, DomainError> {
        let row = sqlx::query("SELECT value FROM app_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.read_pool)
            .await?;
        match row {
            Some(r) => Ok(Some(r.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO app_settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.write_pool)
        .await?;
        Ok(())
    }

    async fn get_all_settings(&self) -> Result<Vec<AppSetting>, DomainError> {
        let rows = sqlx::query("SELECT key, value FROM app_settings")
            .fetch_all(&self.read_pool)
            .await?;
        rows.iter()
            .map(|row| {
                Ok(AppSetting {
                    key: row.try_get("key")?,
                    value: row.try_get("value")?,
                })
            })
            .collect()
    }

    fn subscribe(&self, callback: LogSubscriber) {
        self.subscribers
            .write()
            .expect("subscribers lock poisoned")
            .push(callback);
    }
}

impl SqliteStore {
    async fn get_log_by_id(&self, id: &str) -> Result<Option<LogEntry>, DomainError> {
        let row = sqlx::query("SELECT * FROM log_entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.read_pool)
            .await?;
        match row {
            Some(r) => Ok(Some(Self::row_to_log_entry(&r)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../../../migrations/0001_init.sql");

    async fn test_store() -> SqliteStore {
        // A single shared connection: separate connections to `:memory:`
        // would each get their own empty database.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(SCHEMA).execute(&pool).await.unwrap();
        SqliteStore::new(pool.clone(), pool)
    }

    fn allowed_entry(id: &str, domain: &str, bytes_sent: i64, bytes_recv: i64) -> LogEntry {
        let mut entry = LogEntry::new(
            id.to_string(),
            LogType::Proxy,
            domain.to_string(),
            "10.0.0.1".to_string(),
            "93.184.216.34".to_string(),
            443,
            Protocol::Tcp,
            "curl".to_string(),
            123,
            LogStatus::Allowed,
            None,
            0,
        );
        entry.bytes_sent = bytes_sent;
        entry.bytes_recv = bytes_recv;
        entry
    }

    #[tokio::test]
    async fn update_log_with_none_fields_preserves_prior_values() {
        let store = test_store().await;
        store.add_log(allowed_entry("1", "example.com", 10, 20)).await.unwrap();

        // Only bytes change; status/reason are not part of this update and
        // must survive untouched (invariant 8, §3.1 column mask).
        store
            .update_log(LogUpdate::new("1").with_bytes(100, 200))
            .await
            .unwrap();

        let entry = store.get_log_by_id("1").await.unwrap().unwrap();
        assert_eq!(entry.bytes_sent, 100);
        assert_eq!(entry.bytes_recv, 200);
        assert_eq!(entry.status, LogStatus::Allowed);
        assert_eq!(entry.reason, None);
        assert_eq!(entry.domain, "example.com");
    }

    #[tokio::test]
    async fn update_log_can_set_status_without_touching_bytes() {
        let store = test_store().await;
        store.add_log(allowed_entry("2", "example.com", 5, 7)).await.unwrap();

        store
            .update_log(LogUpdate::new("2").with_status(LogStatus::ConnectionFailed))
            .await
            .unwrap();

        let entry = store.get_log_by_id("2").await.unwrap().unwrap();
        assert_eq!(entry.status, LogStatus::ConnectionFailed);
        assert_eq!(entry.bytes_sent, 5);
        assert_eq!(entry.bytes_recv, 7);
    }

    #[tokio::test]
    async fn add_log_with_bytes_advances_global_stats() {
        let store = test_store().await;
        store.add_log(allowed_entry("3", "example.com", 1_000, 2_000)).await.unwrap();

        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total_upload, 1_000);
        assert_eq!(stats.total_download, 2_000);
    }

    #[tokio::test]
    async fn add_traffic_accumulates_onto_existing_totals() {
        let store = test_store().await;
        store.add_log(allowed_entry("4", "example.com", 1_000, 2_000)).await.unwrap();
        store.add_traffic(500, 700).await.unwrap();

        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total_upload, 1_500);
        assert_eq!(stats.total_download, 2_700);
    }

    #[tokio::test]
    async fn rule_crud_invalidates_cache() {
        let store = test_store().await;
        let id = store
            .add_rule(Rule {
                id: 0,
                rule_type: RuleType::Block,
                pattern: "ads.example.com".to_string(),
                enabled: true,
                source: RuleSource::Custom,
            })
            .await
            .unwrap();

        let rules = store.get_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].pattern, "ads.example.com");

        store.delete_rule(id).await.unwrap();
        let rules = store.get_rules().await.unwrap();
        assert!(rules.is_empty());
    }

    #[tokio::test]
    async fn update_rule_changes_source_alongside_pattern_and_type() {
        let store = test_store().await;
        let id = store
            .add_rule(Rule {
                id: 0,
                rule_type: RuleType::Block,
                pattern: "ads.example.com".to_string(),
                enabled: true,
                source: RuleSource::Default,
            })
            .await
            .unwrap();

        store
            .update_rule(Rule {
                id,
                rule_type: RuleType::Allow,
                pattern: "ads.example.com".to_string(),
                enabled: true,
                source: RuleSource::Custom,
            })
            .await
            .unwrap();

        let rules = store.get_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_type, RuleType::Allow);
        assert_eq!(rules[0].source, RuleSource::Custom);
    }

    #[tokio::test]
    async fn settings_round_trip_through_get_and_set() {
        let store = test_store().await;
        assert_eq!(store.get_setting("proxy_port").await.unwrap(), None);

        store.set_setting("proxy_port", "9090").await.unwrap();
        assert_eq!(
            store.get_setting("proxy_port").await.unwrap(),
            Some("9090".to_string())
        );
    }
}
