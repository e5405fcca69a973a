use async_trait::async_trait;
use custos_application::ports::BlocklistPort;
use custos_domain::DomainError;
use rustc_hash::FxHashSet;
use std::sync::RwLock;
use std::time::Duration;
use tracing::warn;

/// Hosts-file-format domain blocklist (C2): a read-mostly exact-match set
/// rebuilt wholesale on each `load()` and swapped in behind a single
/// `RwLock`. Readers never block on a reload in progress for longer than the
/// final pointer swap.
pub struct BlocklistSet {
    sources: RwLock<Vec<String>>,
    domains: RwLock<FxHashSet<String>>,
    http: reqwest::Client,
}

impl BlocklistSet {
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
            domains: RwLock::new(FxHashSet::default()),
            // A dedicated client with proxying disabled: fetching blocklists
            // must never route back through the SOCKS5 proxy this crate runs.
            http: reqwest::Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build blocklist http client"),
        }
    }

    fn parse_source(body: &str, out: &mut FxHashSet<String>) {
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // Accept both hosts-file lines (`0.0.0.0 ads.example.com`) and
            // bare-domain lines (`ads.example.com`).
            let token = line.split_whitespace().last().unwrap_or("");
            let domain = token.trim_end_matches('.');
            if domain.contains('.') && domain != "0.0.0.0" && domain != "localhost" {
                out.insert(domain.to_string());
            }
        }
    }

    async fn fetch_one(&self, source: &str) -> Option<String> {
        if let Some(path) = source.strip_prefix("file://") {
            return tokio::fs::read_to_string(path).await.ok();
        }
        match self.http.get(source).send().await {
            Ok(resp) => resp.text().await.ok(),
            Err(e) => {
                warn!(source, error = %e, "failed to fetch blocklist source");
                None
            }
        }
    }
}

impl Default for BlocklistSet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlocklistPort for BlocklistSet {
    fn set_sources(&self, sources: Vec<String>) {
        *self.sources.write().expect("blocklist sources lock poisoned") = sources;
    }

    async fn load(&self) -> Result<(), DomainError> {
        let sources = self.sources.read().expect("blocklist sources lock poisoned").clone();
        let mut fresh = FxHashSet::default();

        for source in &sources {
            match self.fetch_one(source).await {
                Some(body) => Self::parse_source(&body, &mut fresh),
                None => continue,
            }
        }

        *self.domains.write().expect("blocklist domains lock poisoned") = fresh;
        Ok(())
    }

    fn is_blocked(&self, domain: &str) -> bool {
        let domain = domain.trim_end_matches('.');
        self.domains
            .read()
            .expect("blocklist domains lock poisoned")
            .contains(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_source_accepts_hosts_and_bare_lines() {
        let body = "# comment\n0.0.0.0 ads.example.com\ntracker.io\n\n0.0.0.0 localhost\nnotadomain\n";
        let mut out = FxHashSet::default();
        BlocklistSet::parse_source(body, &mut out);

        assert!(out.contains("ads.example.com"));
        assert!(out.contains("tracker.io"));
        assert!(!out.contains("localhost"));
        assert!(!out.contains("notadomain"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn parse_source_strips_trailing_dots() {
        let mut out = FxHashSet::default();
        BlocklistSet::parse_source("ads.example.com.\n", &mut out);
        assert!(out.contains("ads.example.com"));
    }

    #[tokio::test]
    async fn load_reads_file_sources_and_swaps_atomically() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.0.0.0 ads.example.com").unwrap();
        writeln!(file, "tracker.io").unwrap();

        let set = BlocklistSet::new();
        set.set_sources(vec![format!("file://{}", file.path().display())]);
        set.load().await.unwrap();

        assert!(set.is_blocked("ads.example.com"));
        assert!(set.is_blocked("tracker.io."));
        assert!(!set.is_blocked("unrelated.com"));
    }

    #[tokio::test]
    async fn load_skips_unreachable_sources_without_failing() {
        let set = BlocklistSet::new();
        set.set_sources(vec!["file:///nonexistent/path/does-not-exist".to_string()]);
        let result = set.load().await;
        assert!(result.is_ok());
        assert!(!set.is_blocked("anything.com"));
    }
}
