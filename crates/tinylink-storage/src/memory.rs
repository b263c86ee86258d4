use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use tinylink_core::repository::{Link, ReadRepository, Repository, Result};
use tinylink_core::{ShortCode, StorageError, UniqueKey};
use tracing::trace;

#[derive(Debug, Clone)]
struct StoredLink {
    original_url: String,
    created_at: Timestamp,
}

/// In-memory implementation of the repository traits using two DashMaps.
///
/// `by_code` holds the links, `by_url` is the reverse index. An insert
/// holds the entry lock for its URL while it claims the code entry, so
/// both uniqueness checks and the write happen under per-key shard locks
/// and unrelated inserts never wait on each other.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    by_code: DashMap<ShortCode, StoredLink>,
    by_url: DashMap<String, ShortCode>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_code: DashMap::with_capacity(capacity),
            by_url: DashMap::with_capacity(capacity),
        }
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortCode>> {
        trace!(url = %original_url, "looking up code by url");
        Ok(self.by_url.get(original_url).map(|code| code.clone()))
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "looking up url by code");
        Ok(self
            .by_code
            .get(code)
            .map(|entry| entry.original_url.clone()))
    }

    async fn get_link(&self, code: &ShortCode) -> Result<Option<Link>> {
        Ok(self.by_code.get(code).map(|entry| Link {
            short_code: code.clone(),
            original_url: entry.original_url.clone(),
            created_at: entry.created_at,
        }))
    }

    async fn code_exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.by_code.contains_key(code))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.by_code.len() as u64)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, original_url: &str, code: &ShortCode) -> Result<()> {
        // Lock order is always url -> code.
        let url_slot = match self.by_url.entry(original_url.to_owned()) {
            Entry::Occupied(_) => {
                return Err(StorageError::duplicate(
                    UniqueKey::OriginalUrl,
                    original_url,
                ))
            }
            Entry::Vacant(slot) => slot,
        };

        match self.by_code.entry(code.clone()) {
            Entry::Occupied(_) => Err(StorageError::duplicate(
                UniqueKey::ShortCode,
                code.as_str(),
            )),
            Entry::Vacant(code_slot) => {
                code_slot.insert(StoredLink {
                    original_url: original_url.to_owned(),
                    created_at: Timestamp::now(),
                });
                url_slot.insert(code.clone());
                Ok(())
            }
        }
    }
}
