use serde::{Deserialize, Serialize};

/// SOCKS5 and control-API binding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// SOCKS5 listener port. Overridden at runtime by the `proxy_port`
    /// setting once the store is open.
    #[serde(default = "default_proxy_port")]
    pub proxy_port: u16,

    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_proxy_port() -> u16 {
    1080
}

fn default_api_port() -> u16 {
    8788
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            proxy_port: default_proxy_port(),
            api_port: default_api_port(),
            bind_address: default_bind_address(),
        }
    }
}
