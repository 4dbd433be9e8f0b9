//! Motif Storage Layer
//!
//! Emulates the page's local key-value store. Every value is a string and
//! every write replaces the previous value under its key in one step.
//! Backends: SQLite ([`Database`]) and an in-process map ([`MemoryStore`]).

mod database;
mod error;
mod memory;
mod migrations;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use store::{KeyValueStore, Quota};

pub type Result<T> = std::result::Result<T, StorageError>;
