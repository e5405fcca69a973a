use crate::ports::{AdblockEnginePort, BlocklistPort, FilterDecision, ProcessAttributorPort, StorePort};
use crate::services::SnowflakeIdGenerator;
use custos_domain::{BlockReason, LogEntry, LogStatus, LogType, Protocol};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A parsed SOCKS5 CONNECT request, as much as the decision engine needs to
/// see. `domain` is `Some` for ATYP=DOMAIN requests; for ATYP=IPv4/IPv6
/// requests it is `None` and `dst_ip` carries the literal address.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub domain: Option<String>,
    pub dst_ip: Option<IpAddr>,
    pub dst_port: u16,
    pub src_ip: IpAddr,
    pub src_port: u16,
}

impl ConnectRequest {
    /// The address the loopback-bypass tunnel dials: the FQDN if present,
    /// otherwise the literal destination IP. Not used for rule/blocklist/
    /// adblock matching, which key on the FQDN alone (see `decide`).
    pub fn match_target(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| self.dst_ip.map(|ip| ip.to_string()).unwrap_or_default())
    }

    fn is_loopback_target(&self) -> bool {
        if let Some(d) = &self.domain {
            if d == "localhost" {
                return true;
            }
        }
        self.dst_ip.map(|ip| ip.is_loopback()).unwrap_or(false)
    }
}

/// Outcome of a decision: either allow (carrying the id of the log row
/// created for this connection, so the byte-counting wrapper can patch it),
/// or deny (the log row, if any, has already been written).
#[derive(Debug, Clone)]
pub enum Decision {
    /// Loopback bypass: no log row exists, no accounting should be done.
    AllowLoopback,
    Allow { log_id: String },
    Deny,
}

/// The filtering decision engine (C7): composes adblock, protection mode,
/// custom rules, and the domain blocklist into the canonical order fixed by
/// the specification (adblock -> protection -> custom rules -> blocklist ->
/// default allow).
pub struct DecisionEngine {
    store: Arc<dyn StorePort>,
    blocklist: Arc<dyn BlocklistPort>,
    adblock: Arc<dyn AdblockEnginePort>,
    process_attributor: Arc<dyn ProcessAttributorPort>,
    id_gen: Arc<SnowflakeIdGenerator>,
    adblock_enabled: AtomicBool,
    protection_enabled: AtomicBool,
}

impl DecisionEngine {
    pub fn new(
        store: Arc<dyn StorePort>,
        blocklist: Arc<dyn BlocklistPort>,
        adblock: Arc<dyn AdblockEnginePort>,
        process_attributor: Arc<dyn ProcessAttributorPort>,
        id_gen: Arc<SnowflakeIdGenerator>,
        adblock_enabled: bool,
        protection_enabled: bool,
    ) -> Self {
        Self {
            store,
            blocklist,
            adblock,
            process_attributor,
            id_gen,
            adblock_enabled: AtomicBool::new(adblock_enabled),
            protection_enabled: AtomicBool::new(protection_enabled),
        }
    }

    pub fn set_adblock_enabled(&self, enabled: bool) {
        self.adblock_enabled.store(enabled, Ordering::Release);
    }

    pub fn set_protection_enabled(&self, enabled: bool) {
        self.protection_enabled.store(enabled, Ordering::Release);
    }

    /// Exposes the shared store handle so the SOCKS5 server can bind a
    /// `CountingConnection` to the log row without owning its own reference.
    pub fn store_handle(&self) -> Arc<dyn StorePort> {
        self.store.clone()
    }

    pub fn adblock_enabled(&self) -> bool {
        self.adblock_enabled.load(Ordering::Acquire)
    }

    pub fn protection_enabled(&self) -> bool {
        self.protection_enabled.load(Ordering::Acquire)
    }

    /// Runs the full §4.4 algorithm for one CONNECT request. Never fails:
    /// any store error while persisting the log is logged by the caller (the
    /// decision result itself is still returned) to uphold "the decision
    /// engine never fails" from §7.
    pub async fn decide(&self, req: &ConnectRequest) -> Decision {
        // 1. Loopback bypass.
        if req.is_loopback_target() {
            return Decision::AllowLoopback;
        }

        // 2. Process attribution (log-only, never affects the verdict).
        let (process_name, process_id) = self.process_attributor.attribute(req.src_port).await;

        // The FQDN if this was an ATYP=DOMAIN request, otherwise "" (never
        // the literal dst IP): this is both the persisted `LogEntry.domain`
        // value (spec §3) and the key matched against adblock/rules/the
        // blocklist, all of which are domain-only checks that must be
        // skipped entirely for IP-literal requests rather than matched
        // against a stringified IP.
        let domain = req.domain.clone().unwrap_or_default();
        let dst_ip_str = req.dst_ip.map(|ip| ip.to_string()).unwrap_or_default();

        let deny = |reason: BlockReason| {
            LogEntry::new(
                self.id_gen.next_id(),
                LogType::Proxy,
                domain.clone(),
                req.src_ip.to_string(),
                dst_ip_str.clone(),
                req.dst_port,
                Protocol::Tcp,
                process_name.clone(),
                process_id,
                LogStatus::Blocked,
                Some(reason),
                0,
            )
        };

        // 3. Adblock check.
        if self.adblock_enabled() && !domain.is_empty() {
            let url = format!("http://{domain}");
            if self.adblock.check(&url, &url, "other") == FilterDecision::Block {
                let _ = self.store.increment_adblock_hit(&domain).await;
                let entry = deny(BlockReason::Adblock);
                self.persist(entry).await;
                return Decision::Deny;
            }
        }

        // 4. Protection mode (plaintext HTTP).
        if self.protection_enabled() && req.dst_port == 80 {
            let entry = deny(BlockReason::ProtectionHttpBlocked);
            self.persist(entry).await;
            return Decision::Deny;
        }

        // 5. Custom rules, first match wins.
        if !domain.is_empty() {
            match self.store.get_rules().await {
                Ok(rules) => {
                    for rule in rules.iter().filter(|r| r.enabled) {
                        if rule.matches(&domain) {
                            let _ = self
                                .store
                                .increment_rule_hit(rule.id, &domain)
                                .await;
                            return match rule.rule_type {
                                custos_domain::RuleType::Allow => {
                                    self.allow(&domain, &dst_ip_str, req, &process_name, process_id)
                                        .await
                                }
                                custos_domain::RuleType::Block => {
                                    let entry = deny(BlockReason::Custom);
                                    self.persist(entry).await;
                                    Decision::Deny
                                }
                            };
                        }
                    }
                }
                Err(_) => {
                    // Store unavailable: treat as "no custom rules" and keep
                    // evaluating the remaining layers rather than failing
                    // the connection.
                }
            }
        }

        // 6. Blocklist.
        if !domain.is_empty() && self.blocklist.is_blocked(&domain) {
            let entry = deny(BlockReason::Blocklist);
            self.persist(entry).await;
            return Decision::Deny;
        }

        // 7. Default allow.
        self.allow(&domain, &dst_ip_str, req, &process_name, process_id)
            .await
    }

    async fn allow(
        &self,
        domain: &str,
        dst_ip_str: &str,
        req: &ConnectRequest,
        process_name: &str,
        process_id: u32,
    ) -> Decision {
        let entry = LogEntry::new(
            self.id_gen.next_id(),
            LogType::Proxy,
            domain.to_string(),
            req.src_ip.to_string(),
            dst_ip_str.to_string(),
            req.dst_port,
            Protocol::Tcp,
            process_name.to_string(),
            process_id,
            LogStatus::Allowed,
            None,
            0,
        );
        let log_id = entry.id.clone();
        self.persist(entry).await;
        Decision::Allow { log_id }
    }

    async fn persist(&self, entry: LogEntry) {
        if let Err(e) = self.store.add_log(entry).await {
            tracing::warn!(error = %e, "failed to persist log entry");
        }
    }
}
