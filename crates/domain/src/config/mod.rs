//! Configuration tree, organized by concern:
//! - `server`: SOCKS5/control-API ports and binding
//! - `database`: SQLite pool and pragma tuning
//! - `logging`: tracing-subscriber level
//! - `refresher`: filter/blocklist refresh tuning
//! - `root`: the assembled `Config` plus CLI override layering
//! - `errors`: configuration load/validate errors

pub mod database;
pub mod errors;
pub mod logging;
pub mod refresher;
pub mod root;
pub mod server;

pub use database::DatabaseConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use refresher::RefresherConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
