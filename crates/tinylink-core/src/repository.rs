use crate::error::{ShortenerError, StorageError, UniqueKey};
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Upper bound on check-then-insert rounds in [`Repository::get_or_create`].
///
/// Every round either returns or has lost an insert race to another writer,
/// so running out of rounds means the code space is saturated.
pub const MAX_INSERT_ROUNDS: u32 = 8;

/// A stored link between an original URL and its short code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// The short code assigned to the URL.
    pub short_code: ShortCode,
    /// The URL exactly as it was submitted.
    pub original_url: String,
    /// When the link was first stored.
    pub created_at: Timestamp,
}

/// A read-only view of a link store.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Returns the code already assigned to `original_url`, if any.
    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortCode>>;

    /// Returns the URL stored under `code`, if any.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Returns the full link stored under `code`, if any.
    async fn get_link(&self, code: &ShortCode) -> Result<Option<Link>>;

    /// Checks whether a short code is already taken.
    async fn code_exists(&self, code: &ShortCode) -> Result<bool>;

    /// Number of stored links.
    async fn count(&self) -> Result<u64>;
}

/// Supplies fresh, currently unused short codes to [`Repository::get_or_create`].
#[async_trait]
pub trait CodeFactory: Send + Sync {
    async fn fresh_code(&self) -> std::result::Result<ShortCode, ShortenerError>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Atomically stores a new link.
    ///
    /// Returns [`StorageError::DuplicateKey`] if either `code` or
    /// `original_url` is already present. Two concurrent inserts touching
    /// the same key never both succeed.
    async fn insert(&self, original_url: &str, code: &ShortCode) -> Result<()>;

    /// Returns the code for `original_url`, creating the link if needed.
    ///
    /// Duplicate-key failures from a concurrent writer are absorbed: losing
    /// the race on the URL re-reads the winner's code, losing it on the code
    /// asks `factory` for another one.
    async fn get_or_create(
        &self,
        original_url: &str,
        factory: &dyn CodeFactory,
    ) -> std::result::Result<ShortCode, ShortenerError> {
        for round in 1..=MAX_INSERT_ROUNDS {
            if let Some(code) = self.find_by_url(original_url).await? {
                trace!(code = %code, url = %original_url, "url already shortened");
                return Ok(code);
            }

            let code = factory.fresh_code().await?;

            match self.insert(original_url, &code).await {
                Ok(()) => {
                    debug!(code = %code, url = %original_url, "created link");
                    return Ok(code);
                }
                Err(StorageError::DuplicateKey {
                    key: UniqueKey::OriginalUrl,
                    ..
                }) => {
                    debug!(url = %original_url, round, "concurrent writer stored url first");
                }
                Err(StorageError::DuplicateKey {
                    key: UniqueKey::ShortCode,
                    ..
                }) => {
                    warn!(code = %code, round, "short code taken between check and insert");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ShortenerError::CodeSpaceExhausted {
            attempts: MAX_INSERT_ROUNDS,
        })
    }
}
