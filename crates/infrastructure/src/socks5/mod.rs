mod wire;

use crate::adblock::AdblockMatcher;
use crate::counting_connection::CountingConnection;
use custos_application::decision::{ConnectRequest, Decision};
use custos_application::ports::AdblockEnginePort;
use custos_application::DecisionEngine;
use custos_domain::{DomainError, LogStatus};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use wire::{read_connect_request, write_reply, Reply};

/// Handle to a running accept loop: cancelling `token` stops the listener;
/// `task` is awaited to confirm the accept loop has actually exited before a
/// restart rebinds the port.
struct RunHandle {
    port: u16,
    token: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

/// SOCKS5 server (C8). `Stopped -> (start) -> Running -> (stop) -> Stopped`.
/// `restart`/`set_port` serialize through `run` so concurrent callers can't
/// race a bind.
pub struct Socks5Server {
    decision: Arc<DecisionEngine>,
    adblock: Arc<AdblockMatcher>,
    run: Mutex<Option<RunHandle>>,
}

impl Socks5Server {
    pub fn new(decision: Arc<DecisionEngine>, adblock: Arc<AdblockMatcher>) -> Self {
        Self {
            decision,
            adblock,
            run: Mutex::new(None),
        }
    }

    pub async fn start(&self, port: u16) -> Result<(), DomainError> {
        let mut guard = self.run.lock().await;
        if guard.is_some() {
            return Err(DomainError::ConfigInvalid(
                "socks5 server already running".into(),
            ));
        }

        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(DomainError::from)?;
        info!(port, "socks5 listener bound");

        let token = CancellationToken::new();
        let accept_token = token.clone();
        let decision = self.decision.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = accept_token.cancelled() => {
                        info!("socks5 listener stopping");
                        break;
                    }
                    accepted = listener.accept() => {
                        match accepted {
                            Ok((stream, peer)) => {
                                let decision = decision.clone();
                                tokio::spawn(async move {
                                    if let Err(e) = handle_connection(stream, peer.ip(), decision).await {
                                        warn!(error = %e, peer = %peer, "socks5 connection ended with error");
                                    }
                                });
                            }
                            Err(e) => {
                                error!(error = %e, "socks5 accept failed");
                            }
                        }
                    }
                }
            }
        });

        *guard = Some(RunHandle { port, token, task });
        Ok(())
    }

    pub async fn stop(&self) {
        let handle = self.run.lock().await.take();
        if let Some(handle) = handle {
            handle.token.cancel();
            // In-flight tunnels are not cancelled (§5): only the accept loop
            // is awaited here.
            let _ = handle.task.await;
        }
    }

    pub fn current_port(&self) -> Option<u16> {
        self.run.try_lock().ok().and_then(|g| g.as_ref().map(|h| h.port))
    }

    pub async fn set_port(&self, port: u16) -> Result<(), DomainError> {
        self.restart(port).await
    }

    pub async fn restart(&self, port: u16) -> Result<(), DomainError> {
        self.stop().await;
        // Give the OS a moment to release the old socket before rebinding.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        self.start(port).await
    }

    pub fn set_protection(&self, enabled: bool) {
        self.decision.set_protection_enabled(enabled);
    }

    pub fn set_adblock_enabled(&self, enabled: bool) {
        self.decision.set_adblock_enabled(enabled);
    }

    pub async fn reload_adblock_engine(&self, rules: String) -> Result<(), DomainError> {
        self.adblock.reload(rules).await
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer_ip: std::net::IpAddr,
    decision: Arc<DecisionEngine>,
) -> Result<(), DomainError> {
    let peer_port = stream.peer_addr().map_err(DomainError::from)?.port();

    let parsed = match read_connect_request(&mut stream).await {
        Ok(Some(req)) => req,
        Ok(None) => {
            // Unsupported command or ATYP: §4.7.1 closes without logging.
            return Ok(());
        }
        Err(_) => return Ok(()),
    };

    let request = ConnectRequest {
        domain: parsed.domain.clone(),
        dst_ip: parsed.dst_ip,
        dst_port: parsed.dst_port,
        src_ip: peer_ip,
        src_port: peer_port,
    };

    let verdict = decision.decide(&request).await;

    let log_id = match verdict {
        Decision::AllowLoopback => {
            write_reply(&mut stream, Reply::Succeeded).await?;
            let target = request.match_target();
            return tunnel_loopback(stream, &target, request.dst_port).await;
        }
        Decision::Deny => {
            write_reply(&mut stream, Reply::ConnectionNotAllowed).await?;
            return Ok(());
        }
        Decision::Allow { log_id } => log_id,
    };

    let upstream = match dial(&request).await {
        Ok(s) => s,
        Err(e) => {
            write_reply(&mut stream, Reply::HostUnreachable).await?;
            mark_dial_failed(&decision, &log_id).await;
            return Err(DomainError::DialFailed(e.to_string()));
        }
    };

    write_reply(&mut stream, Reply::Succeeded).await?;

    let counting = CountingConnection::new(upstream, log_id, decision_store(&decision));
    tunnel(stream, counting).await
}

fn decision_store(decision: &Arc<DecisionEngine>) -> Arc<dyn custos_application::ports::StorePort> {
    decision.store_handle()
}

async fn mark_dial_failed(decision: &Arc<DecisionEngine>, log_id: &str) {
    let store = decision_store(decision);
    let _ = store
        .update_log(custos_domain::LogUpdate::new(log_id).with_status(LogStatus::ConnectionFailed))
        .await;
}

/// Dials the target via the system resolver (for ATYP=DOMAIN) or directly by
/// literal address (ATYP=IPv4/IPv6), matching §4.7's "system resolver+dialer".
async fn dial(request: &ConnectRequest) -> std::io::Result<TcpStream> {
    if let Some(ip) = request.dst_ip {
        TcpStream::connect(std::net::SocketAddr::new(ip, request.dst_port)).await
    } else {
        let domain = request.domain.clone().unwrap_or_default();
        TcpStream::connect((domain.as_str(), request.dst_port)).await
    }
}

async fn tunnel(mut client: TcpStream, mut upstream: CountingConnection) -> Result<(), DomainError> {
    let _ = tokio::io::copy_bidirectional(&mut client, &mut upstream).await;
    upstream.finish(None).await;
    Ok(())
}

async fn tunnel_loopback(mut client: TcpStream, target: &str, port: u16) -> Result<(), DomainError> {
    let mut upstream = TcpStream::connect((target, port))
        .await
        .map_err(DomainError::from)?;
    let _ = tokio::io::copy_bidirectional(&mut client, &mut upstream).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocklist::BlocklistSet;
    use crate::process::PlatformProcessAttributor;
    use crate::store::MemoryStore;
    use custos_application::services::SnowflakeIdGenerator;

    fn server() -> Socks5Server {
        let store: Arc<dyn custos_application::ports::StorePort> = Arc::new(MemoryStore::default());
        let blocklist: Arc<dyn custos_application::ports::BlocklistPort> = Arc::new(BlocklistSet::new());
        let adblock = Arc::new(AdblockMatcher::new());
        let decision = Arc::new(DecisionEngine::new(
            store,
            blocklist,
            adblock.clone(),
            Arc::new(PlatformProcessAttributor::new()),
            Arc::new(SnowflakeIdGenerator::new(1)),
            true,
            false,
        ));
        Socks5Server::new(decision, adblock)
    }

    #[tokio::test]
    async fn start_reports_its_port_and_stop_clears_it() {
        let server = server();
        server.start(0).await.unwrap();

        // Bound with port 0: the OS picked an ephemeral one, but
        // `current_port` reports whatever was requested at `start`, which is
        // the contract callers rely on when they picked the port themselves.
        assert_eq!(server.current_port(), Some(0));

        server.stop().await;
        assert_eq!(server.current_port(), None);
    }

    #[tokio::test]
    async fn starting_twice_without_stopping_is_rejected() {
        let server = server();
        server.start(18901).await.unwrap();

        let second = server.start(18902).await;
        assert!(second.is_err());

        server.stop().await;
    }

    #[tokio::test]
    async fn set_port_rebinds_to_the_new_port() {
        let server = server();
        server.start(18903).await.unwrap();

        server.set_port(18904).await.unwrap();
        assert_eq!(server.current_port(), Some(18904));

        server.stop().await;
    }

    #[tokio::test]
    async fn protection_and_adblock_flags_reach_the_decision_engine() {
        let server = server();
        server.set_protection(true);
        assert!(server.decision.protection_enabled());

        server.set_adblock_enabled(false);
        assert!(!server.decision.adblock_enabled());
    }

    #[tokio::test]
    async fn reload_adblock_engine_is_observed_by_a_fresh_decision() {
        let server = server();
        server
            .reload_adblock_engine("||reloaded-via-socks5.test^".to_string())
            .await
            .unwrap();

        let decision = server
            .decision
            .decide(&ConnectRequest {
                domain: Some("reloaded-via-socks5.test".to_string()),
                dst_ip: None,
                dst_port: 80,
                src_ip: std::net::IpAddr::from([192, 168, 1, 1]),
                src_port: 55000,
            })
            .await;

        assert!(matches!(decision, Decision::Deny));
    }
}
