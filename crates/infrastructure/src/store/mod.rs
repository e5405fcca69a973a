pub mod memory;
pub mod pool;
pub mod sqlite;

pub use memory::MemoryStore;
pub use pool::{create_read_pool, create_write_pool};
pub use sqlite::SqliteStore;
