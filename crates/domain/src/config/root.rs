use super::{ConfigError, DatabaseConfig, LoggingConfig, RefresherConfig, ServerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// CLI-supplied overrides, applied on top of the file-or-default config.
/// Mirrors the teacher's `CliOverrides` pattern: every field optional, `Some`
/// wins over whatever the file/default produced.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub proxy_port: Option<u16>,
    pub api_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
    pub database_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub refresher: RefresherConfig,
}

impl Config {
    /// Loads from `path` if given and present, otherwise starts from
    /// defaults; then layers `overrides` on top.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) if Path::new(p).exists() => {
                let raw = fs::read_to_string(p).map_err(|source| ConfigError::ReadFailed {
                    path: p.to_string(),
                    source,
                })?;
                toml::from_str(&raw).map_err(|source| ConfigError::ParseFailed {
                    path: p.to_string(),
                    source,
                })?
            }
            _ => Config::default(),
        };

        if let Some(port) = overrides.proxy_port {
            config.server.proxy_port = port;
        }
        if let Some(port) = overrides.api_port {
            config.server.api_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            config.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            config.logging.level = level;
        }
        if let Some(path) = overrides.database_path {
            config.database.path = path;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.proxy_port == 0 {
            return Err(ConfigError::Invalid(
                "server.proxy_port must be nonzero".to_string(),
            ));
        }
        if self.database.write_pool_max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.write_pool_max_connections must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}
