use std::fmt::Display;
use thiserror::Error;

/// A column the link store keeps unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueKey {
    ShortCode,
    OriginalUrl,
}

impl Display for UniqueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueKey::ShortCode => f.write_str("short_code"),
            UniqueKey::OriginalUrl => f.write_str("original_url"),
        }
    }
}

/// Errors reported by link store backends.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// An insert lost a race on one of the unique columns.
    #[error("duplicate {key}: {value}")]
    DuplicateKey { key: UniqueKey, value: String },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

impl StorageError {
    pub fn duplicate(key: UniqueKey, value: impl Into<String>) -> Self {
        Self::DuplicateKey {
            key,
            value: value.into(),
        }
    }
}

/// Errors surfaced to callers of the shortener.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("no free short code found after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
