//! Repository implementations of the core storage port.

mod sqlite_kv_store;

pub use sqlite_kv_store::SqliteKeyValueStore;
