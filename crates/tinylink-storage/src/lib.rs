//! Link store backends for tinylink.
//!
//! Both backends enforce uniqueness of the short code and of the original
//! URL at the storage layer, so [`Repository::get_or_create`] can resolve
//! races through [`StorageError::DuplicateKey`] instead of locking.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;
pub use tinylink_core::repository::{ReadRepository, Repository, Result};
pub use tinylink_core::{StorageError, UniqueKey};
