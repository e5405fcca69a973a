//! Infrastructure adapters implementing the application-layer ports: the
//! SQLite-backed store, the domain blocklist, the adblock matcher, process
//! attribution, the SOCKS5 server, and the filter refresher.

pub mod adblock;
pub mod blocklist;
pub mod counting_connection;
pub mod process;
pub mod refresher;
pub mod socks5;
pub mod store;
pub mod system_integration;

pub use adblock::AdblockMatcher;
pub use blocklist::BlocklistSet;
pub use process::PlatformProcessAttributor;
pub use refresher::FilterRefresher;
pub use socks5::Socks5Server;
pub use store::{MemoryStore, SqliteStore};
pub use system_integration::LinuxSystemIntegration;
