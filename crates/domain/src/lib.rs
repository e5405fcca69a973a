//! Custos domain layer: the types every other crate builds on.

pub mod adblock_filter;
pub mod app_setting;
pub mod config;
pub mod errors;
pub mod log_entry;
pub mod rule;
pub mod stats;

pub use adblock_filter::AdblockFilter;
pub use app_setting::{parse_bool_setting, parse_port_setting, AppSetting, SettingKey};
pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use log_entry::{BlockReason, LogEntry, LogStatus, LogType, LogUpdate, Protocol};
pub use rule::{PaginatedRules, Rule, RuleSource, RuleType};
pub use stats::{Stats, TopDomain, TrafficDataPoint};
