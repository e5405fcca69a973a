use custos_application::decision::DecisionEngine;
use custos_application::services::SnowflakeIdGenerator;
use custos_domain::{Rule, RuleSource, RuleType};
use custos_infrastructure::{AdblockMatcher, BlocklistSet, PlatformProcessAttributor, Socks5Server, SqliteStore};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// A running proxy bound to an isolated, file-backed sqlite database — one
/// connection shared by both the read and write pools, so writes made by
/// one use case are visible to the next without a real pool's connection
/// juggling.
pub struct Harness {
    pub socks5: Arc<Socks5Server>,
    pub store: Arc<SqliteStore>,
    pub blocklist: Arc<BlocklistSet>,
    pub port: u16,
    _db_file: tempfile::NamedTempFile,
    _blocklist_file: Option<tempfile::NamedTempFile>,
}

impl Harness {
    pub async fn start(port: u16, rules: Vec<Rule>, blocked_domains: &[&str]) -> Self {
        let db_file = tempfile::NamedTempFile::new().unwrap();
        let url = format!("sqlite://{}", db_file.path().display());
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        sqlx::query(SCHEMA).execute(&pool).await.unwrap();

        let store = Arc::new(SqliteStore::new(pool.clone(), pool));
        for rule in rules {
            custos_application::ports::StorePort::add_rule(&*store, rule)
                .await
                .unwrap();
        }

        let blocklist = Arc::new(BlocklistSet::new());
        let blocklist_file = if blocked_domains.is_empty() {
            None
        } else {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            for domain in blocked_domains {
                writeln!(file, "{domain}").unwrap();
            }
            custos_application::ports::BlocklistPort::set_sources(
                &*blocklist,
                vec![format!("file://{}", file.path().display())],
            );
            custos_application::ports::BlocklistPort::load(&*blocklist)
                .await
                .unwrap();
            Some(file)
        };

        let adblock = Arc::new(AdblockMatcher::new());
        let process_attributor = Arc::new(PlatformProcessAttributor::new());
        let id_gen = Arc::new(SnowflakeIdGenerator::new(1));

        let decision = Arc::new(DecisionEngine::new(
            store.clone(),
            blocklist.clone(),
            adblock.clone(),
            process_attributor,
            id_gen,
            false,
            false,
        ));

        let socks5 = Arc::new(Socks5Server::new(decision, adblock));
        socks5.start(port).await.unwrap();
        // Give the accept loop a moment to actually be listening.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        Harness {
            socks5,
            store,
            blocklist,
            port,
            _db_file: db_file,
            _blocklist_file: blocklist_file,
        }
    }

    pub async fn stop(&self) {
        self.socks5.stop().await;
    }
}

pub fn custom_rule(id: i64, rule_type: RuleType, pattern: &str) -> Rule {
    Rule {
        id,
        rule_type,
        pattern: pattern.to_string(),
        enabled: true,
        source: RuleSource::Custom,
    }
}

/// Speaks the client side of a NOAUTH handshake and a CONNECT request over a
/// fresh TCP connection to the proxy, returning the open stream plus the
/// 10-byte reply.
pub async fn socks5_connect(
    proxy_port: u16,
    target: ConnectTarget<'_>,
    dst_port: u16,
) -> (TcpStream, [u8; 10]) {
    let mut stream = TcpStream::connect(("127.0.0.1", proxy_port)).await.unwrap();
    stream.write_all(&[0x05, 1, 0x00]).await.unwrap();
    let mut method_reply = [0u8; 2];
    stream.read_exact(&mut method_reply).await.unwrap();
    assert_eq!(method_reply, [0x05, 0x00]);

    let mut request = vec![0x05, 0x01, 0x00];
    match target {
        ConnectTarget::Domain(domain) => {
            request.push(0x03);
            request.push(domain.len() as u8);
            request.extend_from_slice(domain.as_bytes());
        }
        ConnectTarget::Ipv4(octets) => {
            request.push(0x01);
            request.extend_from_slice(&octets);
        }
    }
    request.extend_from_slice(&dst_port.to_be_bytes());
    stream.write_all(&request).await.unwrap();

    let mut reply = [0u8; 10];
    stream.read_exact(&mut reply).await.unwrap();
    (stream, reply)
}

pub enum ConnectTarget<'a> {
    Domain(&'a str),
    Ipv4([u8; 4]),
}
