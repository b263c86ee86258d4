use async_trait::async_trait;
use jiff::Timestamp;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tinylink_core::repository::{Link, ReadRepository, Repository, Result};
use tinylink_core::{ShortCode, StorageError, UniqueKey};
use tracing::{debug, info, trace};

/// DDL for the `links` table.
pub const SCHEMA: &str = include_str!("../ddl/sqlite/links.sql");

/// SQLite implementation of the repository contract.
///
/// Uniqueness of `short_code` and `original_url` is declared in the schema,
/// so a racing insert fails inside SQLite and is reported as
/// [`StorageError::DuplicateKey`] naming the column it lost on.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a repository from an existing SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `database_url`,
    /// e.g. `sqlite://database.db`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(map_sqlx_error)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Opens a private in-memory database with the schema already applied.
    ///
    /// The pool is pinned to a single long-lived connection, since every
    /// SQLite connection to `:memory:` sees its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(map_sqlx_error)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let repository = Self::new(pool);
        repository.init_schema().await?;
        Ok(repository)
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the `links` table if it does not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("links schema ready");
        Ok(())
    }

    /// Drops every stored link and recreates an empty schema.
    pub async fn reset_schema(&self) -> Result<()> {
        sqlx::raw_sql("DROP TABLE IF EXISTS links")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        self.init_schema().await?;
        info!("links schema reset");
        Ok(())
    }
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", seconds))
    })
}

/// Maps a unique violation on `links` to the key it was raised for.
///
/// SQLite reports these as `UNIQUE constraint failed: links.<column>`.
fn duplicate_key(err: &sqlx::Error, original_url: &str, code: &ShortCode) -> Option<StorageError> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }

    let message = db_err.message();
    if message.contains("links.original_url") {
        Some(StorageError::duplicate(UniqueKey::OriginalUrl, original_url))
    } else if message.contains("links.short_code") {
        Some(StorageError::duplicate(UniqueKey::ShortCode, code.as_str()))
    } else {
        None
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Configuration(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for SqliteRepository {
    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortCode>> {
        trace!(url = %original_url, "looking up code by url");

        let row = sqlx::query(
            r#"
            SELECT short_code
            FROM links
            WHERE original_url = ?
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
        Ok(Some(ShortCode::new_unchecked(short_code)))
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "looking up url by code");

        let row = sqlx::query(
            r#"
            SELECT original_url
            FROM links
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|row| row.try_get::<String, _>("original_url").map_err(map_sqlx_error))
            .transpose()
    }

    async fn get_link(&self, code: &ShortCode) -> Result<Option<Link>> {
        let row = sqlx::query(
            r#"
            SELECT original_url, created_at
            FROM links
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
        let created_at_raw: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

        Ok(Some(Link {
            short_code: code.clone(),
            original_url,
            created_at: parse_created_at(created_at_raw)?,
        }))
    }

    async fn code_exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM links
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }

    async fn count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM links")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let total: i64 = row.try_get("total").map_err(map_sqlx_error)?;
        u64::try_from(total)
            .map_err(|_| StorageError::InvalidData(format!("negative link count: {total}")))
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn insert(&self, original_url: &str, code: &ShortCode) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO links (original_url, short_code, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(original_url)
        .bind(code.as_str())
        .bind(Timestamp::now().as_second())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => Err(duplicate_key(&err, original_url, code)
                .unwrap_or_else(|| map_sqlx_error(err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_declares_both_unique_constraints() {
        assert!(SCHEMA.contains("UNIQUE (original_url)"));
        assert!(SCHEMA.contains("UNIQUE (short_code)"));
    }

    #[test]
    fn parse_created_at_rejects_out_of_range() {
        assert!(parse_created_at(0).is_ok());
        assert!(matches!(
            parse_created_at(i64::MAX),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn pool_errors_are_classified() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StorageError::Timeout(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StorageError::InvalidData(_)
        ));
    }
}
