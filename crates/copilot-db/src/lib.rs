#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Linked for the bundled SQLite build only
use libsqlite3_sys as _;

pub mod repositories;
pub mod setup;

pub use repositories::SqliteKeyValueStore;
pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;

