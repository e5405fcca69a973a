#[path = "../common/mod.rs"]
mod common;

use common::{custom_rule, socks5_connect, ConnectTarget, Harness};
use custos_domain::{BlockReason, LogStatus, RuleType};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const SUCCEEDED: u8 = 0x00;
const CONNECTION_NOT_ALLOWED: u8 = 0x02;

#[tokio::test]
async fn loopback_connect_succeeds_without_logging_or_attribution() {
    // A throwaway "upstream" bound on loopback stands in for whatever local
    // service the client is reaching.
    let upstream = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream_port = upstream.local_addr().unwrap().port();

    let h = Harness::start(18801, Vec::new(), &[]).await;

    let (mut client, reply) = socks5_connect(
        h.port,
        ConnectTarget::Ipv4([127, 0, 0, 1]),
        upstream_port,
    )
    .await;
    assert_eq!(reply[1], SUCCEEDED);

    let (mut server_side, _) = upstream.accept().await.unwrap();
    client.write_all(b"ping").await.unwrap();
    let mut buf = [0u8; 4];
    server_side.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"ping");

    let logs = custos_application::ports::StorePort::get_recent_logs(&*h.store, 100)
        .await
        .unwrap();
    assert!(logs.is_empty());

    h.stop().await;
}

#[tokio::test]
async fn blocklisted_domain_is_denied_and_logged() {
    let h = Harness::start(18802, Vec::new(), &["ads.example.com"]).await;

    let (_client, reply) = socks5_connect(h.port, ConnectTarget::Domain("ads.example.com"), 443).await;
    assert_eq!(reply[1], CONNECTION_NOT_ALLOWED);

    let logs = custos_application::ports::StorePort::get_recent_logs(&*h.store, 100)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, LogStatus::Blocked);
    assert_eq!(logs[0].reason, Some(BlockReason::Blocklist));
    assert_eq!(logs[0].domain, "ads.example.com");

    h.stop().await;
}

#[tokio::test]
async fn wildcard_rule_requires_dot_boundary_then_exact_rule_denies_bare_domain() {
    let rules = vec![
        custom_rule(1, RuleType::Block, "*.tracker.io"),
        custom_rule(2, RuleType::Block, "tracker.io"),
    ];
    let h = Harness::start(18803, rules, &[]).await;

    let (_client, subdomain_reply) =
        socks5_connect(h.port, ConnectTarget::Domain("a.b.tracker.io"), 443).await;
    assert_eq!(subdomain_reply[1], CONNECTION_NOT_ALLOWED);

    let (_client, bare_reply) = socks5_connect(h.port, ConnectTarget::Domain("tracker.io"), 443).await;
    assert_eq!(bare_reply[1], CONNECTION_NOT_ALLOWED);

    let logs = custos_application::ports::StorePort::get_recent_logs(&*h.store, 100)
        .await
        .unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.reason == Some(BlockReason::Custom)));

    h.stop().await;
}

#[tokio::test]
async fn bind_command_gets_command_not_supported_and_is_never_logged() {
    let h = Harness::start(18804, Vec::new(), &[]).await;

    let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", h.port)).await.unwrap();
    stream.write_all(&[0x05, 1, 0x00]).await.unwrap();
    let mut method_reply = [0u8; 2];
    stream.read_exact(&mut method_reply).await.unwrap();

    // CMD = 0x02 (BIND), never supported.
    let mut request = vec![0x05, 0x02, 0x00, 0x01];
    request.extend_from_slice(&[127, 0, 0, 1]);
    request.extend_from_slice(&0u16.to_be_bytes());
    stream.write_all(&request).await.unwrap();

    let mut reply = [0u8; 10];
    stream.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply[1], 0x07);

    let logs = custos_application::ports::StorePort::get_recent_logs(&*h.store, 100)
        .await
        .unwrap();
    assert!(logs.is_empty());

    h.stop().await;
}
