use crate::repository::Link;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// The operations outer layers (HTTP, CLI) use to reach the link store.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Returns the short code for `original_url`, creating one on first submission.
    ///
    /// Submitting the same URL again yields the same code.
    async fn submit(&self, original_url: &str) -> Result<ShortCode>;

    /// Resolves a short code to the URL it was issued for.
    ///
    /// Returns [`ShortenerError::NotFound`](crate::ShortenerError::NotFound)
    /// for codes that were never issued.
    async fn resolve(&self, code: &str) -> Result<String>;

    /// Like [`Shortener::resolve`], but returns the whole stored link.
    async fn lookup(&self, code: &str) -> Result<Link>;

    /// Number of links issued so far.
    async fn count(&self) -> Result<u64>;
}
