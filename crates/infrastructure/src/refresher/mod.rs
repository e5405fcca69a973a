use crate::adblock::AdblockMatcher;
use custos_application::ports::{AdblockEnginePort, BlocklistPort, StorePort};
use custos_domain::AdblockFilter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

const CANONICAL_HOSTS_URL: &str = "https://raw.githubusercontent.com/StevenBlack/hosts/master/hosts";
const CACHE_TTL: Duration = Duration::from_secs(24 * 3600);

/// Hard-coded fallback rules prepended to every reload so the adblock
/// matcher is never completely empty between the first boot and the first
/// successful filter fetch.
const DEFAULT_HEADER: &str = "||doubleclick.net^\n||googlesyndication.com^\n||googleadservices.com^\n||adnxs.com^\n||scorecardresearch.com^\n";

/// Curated defaults seeded into the `adblock_filters` table on first run.
const DEFAULT_FILTERS: &[(&str, &str)] = &[
    ("EasyList", "https://easylist.to/easylist/easylist.txt"),
    ("EasyPrivacy", "https://easylist.to/easylist/easyprivacy.txt"),
];

/// Periodic filter/blocklist refresher (C9). A process-wide mutex makes
/// concurrent refresh triggers (boot + periodic job + manual API call)
/// single-flight: only one actually runs the fetch/reload sequence at a
/// time, the rest observe its result.
pub struct FilterRefresher {
    store: Arc<dyn StorePort>,
    blocklist: Arc<dyn BlocklistPort>,
    adblock: Arc<AdblockMatcher>,
    data_dir: PathBuf,
    http: reqwest::Client,
    single_flight: Mutex<()>,
}

impl FilterRefresher {
    pub fn new(
        store: Arc<dyn StorePort>,
        blocklist: Arc<dyn BlocklistPort>,
        adblock: Arc<AdblockMatcher>,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            blocklist,
            adblock,
            data_dir,
            http: reqwest::Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build refresher http client"),
            single_flight: Mutex::new(()),
        }
    }

    /// Seeds `adblock_filters` with curated defaults on first run (table
    /// empty), then triggers a refresh if anything was added.
    pub async fn seed_default_filters(&self) {
        let existing = match self.store.get_adblock_filters().await {
            Ok(filters) => filters,
            Err(e) => {
                warn!(error = %e, "failed to read adblock filters during seed");
                return;
            }
        };
        if !existing.is_empty() {
            return;
        }

        let _ = self.store.clear_adblock_filters().await;
        let mut added = false;
        for (name, url) in DEFAULT_FILTERS {
            if self
                .store
                .add_adblock_filter(AdblockFilter {
                    id: 0,
                    name: name.to_string(),
                    url: url.to_string(),
                    enabled: true,
                    last_updated: None,
                })
                .await
                .is_ok()
            {
                added = true;
            }
        }

        if added {
            self.refresh().await;
        }
    }

    /// Runs the full §4.9 refresh sequence. Never returns an error to the
    /// caller: a failed fetch leaves the previous cache/engine in place and
    /// is logged.
    pub async fn refresh(&self) {
        let _guard = self.single_flight.lock().await;

        let filters = match self.store.get_adblock_filters().await {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "refresh: failed to read adblock filters");
                return;
            }
        };

        let mut combined = String::from(DEFAULT_HEADER);
        let mut blocklist_sources = vec![CANONICAL_HOSTS_URL.to_string()];

        for filter in filters.iter().filter(|f| f.enabled) {
            let cache_path = self.data_dir.join("filters").join(format!("{}.txt", filter.id));

            let body = match self.cached_or_fetch(&cache_path, &filter.url).await {
                Some(body) => body,
                None => continue,
            };

            combined.push_str(&body);
            combined.push('\n');

            if cache_path.exists() {
                blocklist_sources.push(cache_path.to_string_lossy().to_string());
            } else {
                blocklist_sources.push(filter.url.clone());
            }

            let mut updated = filter.clone();
            updated.last_updated = Some(chrono::Utc::now());
            if let Err(e) = self
                .store
                .add_adblock_filter(updated)
                .await
            {
                warn!(error = %e, filter = %filter.name, "failed to record filter refresh timestamp");
            }
        }

        if let Err(e) = self.adblock.reload(combined).await {
            warn!(error = %e, "failed to reload adblock engine");
        }

        self.blocklist.set_sources(blocklist_sources);
        if let Err(e) = self.blocklist.load().await {
            warn!(error = %e, "failed to reload blocklist sources");
        }

        info!("filter refresh completed");
    }

    async fn cached_or_fetch(&self, cache_path: &std::path::Path, url: &str) -> Option<String> {
        if let Ok(meta) = tokio::fs::metadata(cache_path).await {
            if let Ok(modified) = meta.modified() {
                if modified.elapsed().map(|e| e < CACHE_TTL).unwrap_or(false) {
                    if let Ok(body) = tokio::fs::read_to_string(cache_path).await {
                        return Some(body);
                    }
                }
            }
        }

        let body = match self.http.get(url).send().await {
            Ok(resp) => match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(url, error = %e, "failed to read filter response body");
                    return None;
                }
            },
            Err(e) => {
                warn!(url, error = %e, "failed to fetch filter list");
                return None;
            }
        };

        if let Some(parent) = cache_path.parent() {
            let _ = tokio::fs::create_dir_all(parent).await;
        }
        if let Err(e) = tokio::fs::write(cache_path, &body).await {
            warn!(path = %cache_path.display(), error = %e, "failed to write filter cache file");
        }

        Some(body)
    }
}
