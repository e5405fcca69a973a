use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    Proxy,
    Dns,
    System,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Proxy => "proxy",
            LogType::Dns => "dns",
            LogType::System => "system",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "proxy" => Some(LogType::Proxy),
            "dns" => Some(LogType::Dns),
            "system" => Some(LogType::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tcp" => Some(Protocol::Tcp),
            "udp" => Some(Protocol::Udp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStatus {
    Allowed,
    Blocked,
    ConnectionFailed,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Allowed => "allowed",
            LogStatus::Blocked => "blocked",
            LogStatus::ConnectionFailed => "connection_failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "allowed" => Some(LogStatus::Allowed),
            "blocked" => Some(LogStatus::Blocked),
            "connection_failed" => Some(LogStatus::ConnectionFailed),
            _ => None,
        }
    }
}

/// Why a connection was blocked. Mirrors the order of checks in the decision
/// engine (adblock, then protection mode, then custom rule, then blocklist).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    Adblock,
    ProtectionHttpBlocked,
    Custom,
    Blocklist,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::Adblock => "adblock",
            BlockReason::ProtectionHttpBlocked => "protection_http_blocked",
            BlockReason::Custom => "custom",
            BlockReason::Blocklist => "blocklist",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "adblock" => Some(BlockReason::Adblock),
            "protection_http_blocked" => Some(BlockReason::ProtectionHttpBlocked),
            "custom" => Some(BlockReason::Custom),
            "blocklist" => Some(BlockReason::Blocklist),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub log_type: LogType,
    pub domain: String,
    pub src_ip: String,
    pub dst_ip: String,
    pub dst_port: u16,
    pub protocol: Protocol,
    pub process_name: String,
    pub process_id: u32,
    pub bytes_sent: i64,
    pub bytes_recv: i64,
    pub status: LogStatus,
    pub reason: Option<BlockReason>,
    pub latency_ms: i64,
}

impl LogEntry {
    /// Build the entry the decision engine hands to the store at the moment a
    /// verdict is reached. `id` must already be unique (see the identifier
    /// generator).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        log_type: LogType,
        domain: String,
        src_ip: String,
        dst_ip: String,
        dst_port: u16,
        protocol: Protocol,
        process_name: String,
        process_id: u32,
        status: LogStatus,
        reason: Option<BlockReason>,
        latency_ms: i64,
    ) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            log_type,
            domain,
            src_ip,
            dst_ip,
            dst_port,
            protocol,
            process_name,
            process_id,
            bytes_sent: 0,
            bytes_recv: 0,
            status,
            reason,
            latency_ms,
        }
    }
}

/// A partial update to an existing log row, keyed by `id`. Every field besides
/// `id` is optional: a field that is `None` must leave the stored value
/// untouched. This is the representation that lets the byte-counting
/// connection wrapper flush only the counters it actually advanced this tick
/// without risking a zero-valued field clobbering unrelated columns.
#[derive(Debug, Clone, Default)]
pub struct LogUpdate {
    pub id: String,
    pub bytes_sent: Option<i64>,
    pub bytes_recv: Option<i64>,
    pub status: Option<LogStatus>,
    pub reason: Option<BlockReason>,
}

impl LogUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_bytes(mut self, sent: i64, recv: i64) -> Self {
        self.bytes_sent = Some(sent);
        self.bytes_recv = Some(recv);
        self
    }

    pub fn with_status(mut self, status: LogStatus) -> Self {
        self.status = Some(status);
        self
    }
}
