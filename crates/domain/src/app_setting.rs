use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSetting {
    pub key: String,
    pub value: String,
}

/// Recognized setting keys and their fallback defaults (§7d: a bad or missing
/// value never fails a read, it falls back silently).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ProxyPort,
    ProtectionEnabled,
    AdblockEnabled,
    NotificationsEnabled,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ProxyPort => "proxy_port",
            SettingKey::ProtectionEnabled => "protection_enabled",
            SettingKey::AdblockEnabled => "adblock_enabled",
            SettingKey::NotificationsEnabled => "notifications_enabled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "proxy_port" => Some(SettingKey::ProxyPort),
            "protection_enabled" => Some(SettingKey::ProtectionEnabled),
            "adblock_enabled" => Some(SettingKey::AdblockEnabled),
            "notifications_enabled" => Some(SettingKey::NotificationsEnabled),
            _ => None,
        }
    }

    pub fn default_value(&self) -> &'static str {
        match self {
            SettingKey::ProxyPort => "1080",
            SettingKey::ProtectionEnabled => "false",
            SettingKey::AdblockEnabled => "true",
            SettingKey::NotificationsEnabled => "true",
        }
    }

    pub fn all() -> &'static [SettingKey] {
        &[
            SettingKey::ProxyPort,
            SettingKey::ProtectionEnabled,
            SettingKey::AdblockEnabled,
            SettingKey::NotificationsEnabled,
        ]
    }
}

/// Parses a stored boolean setting, falling back to `default` on any parse
/// failure instead of propagating an error (§7d).
pub fn parse_bool_setting(value: &str, default: bool) -> bool {
    match value {
        "true" | "1" => true,
        "false" | "0" => false,
        _ => default,
    }
}

/// Parses a stored port setting, falling back to `default` on any parse
/// failure or out-of-range value.
pub fn parse_port_setting(value: &str, default: u16) -> u16 {
    value.parse::<u16>().unwrap_or(default)
}
