use async_trait::async_trait;
use std::sync::Arc;
use tinylink_core::{Link, Repository, ShortCode, Shortener, ShortenerError};
use tinylink_generator::{CodeAllocator, Error as GeneratorError, Generator};
use tinylink_generator::{GeneratorSettings, RandomGenerator};
use tracing::{debug, info, trace};

/// A concrete implementation of the `Shortener` trait.
///
/// The repository handle is shared with the allocator, so the collision
/// check and the insert always talk to the same store.
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    allocator: CodeAllocator<R, G>,
}

impl<R: Repository> ShortenerService<R, RandomGenerator> {
    /// Creates a service that issues random codes as described by `settings`.
    pub fn new(repository: R, settings: GeneratorSettings) -> Result<Self, GeneratorError> {
        let repository = Arc::new(repository);
        let allocator = CodeAllocator::random(Arc::clone(&repository), settings)?;
        Ok(Self {
            repository,
            allocator,
        })
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a service with a custom generator.
    pub fn with_generator(
        repository: R,
        generator: G,
        max_attempts: u32,
    ) -> Result<Self, GeneratorError> {
        let repository = Arc::new(repository);
        let allocator = CodeAllocator::new(Arc::clone(&repository), generator, max_attempts)?;
        Ok(Self {
            repository,
            allocator,
        })
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Rejects empty submissions. Anything else is stored verbatim.
    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.trim().is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Codes that could never have been issued resolve to `NotFound`.
    fn parse_code(code: &str) -> Result<ShortCode, ShortenerError> {
        ShortCode::new(code).map_err(|e| {
            debug!(code = %code, error = %e, "rejecting malformed short code");
            ShortenerError::NotFound(code.to_string())
        })
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn submit(&self, original_url: &str) -> Result<ShortCode, ShortenerError> {
        Self::validate_url(original_url)?;

        let code = self
            .repository
            .get_or_create(original_url, &self.allocator)
            .await?;

        info!(code = %code, url = %original_url, "submitted url");
        Ok(code)
    }

    async fn resolve(&self, code: &str) -> Result<String, ShortenerError> {
        let short_code = Self::parse_code(code)?;

        match self.repository.find_by_code(&short_code).await? {
            Some(url) => {
                debug!(code = %short_code, url = %url, "resolved short code");
                Ok(url)
            }
            None => {
                trace!(code = %short_code, "short code not found");
                Err(ShortenerError::NotFound(code.to_string()))
            }
        }
    }

    async fn lookup(&self, code: &str) -> Result<Link, ShortenerError> {
        let short_code = Self::parse_code(code)?;

        self.repository
            .get_link(&short_code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(code.to_string()))
    }

    async fn count(&self) -> Result<u64, ShortenerError> {
        Ok(self.repository.count().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tinylink_storage::InMemoryRepository;

    /// Produces `wh0000`, `wh0001`, ...
    #[derive(Debug, Default)]
    struct SeqGenerator {
        counter: AtomicU64,
    }

    impl Generator for SeqGenerator {
        fn generate(&self) -> ShortCode {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            ShortCode::new_unchecked(format!("wh{:04}", n))
        }
    }

    fn test_service() -> ShortenerService<InMemoryRepository, SeqGenerator> {
        ShortenerService::with_generator(InMemoryRepository::new(), SeqGenerator::default(), 3)
            .unwrap()
    }

    #[tokio::test]
    async fn submit_issues_generated_code() {
        let service = test_service();

        let code = service.submit("https://example.com").await.unwrap();
        assert_eq!(code.as_str(), "wh0000");
    }

    #[tokio::test]
    async fn submit_is_idempotent() {
        let service = test_service();

        let first = service.submit("https://example.com").await.unwrap();
        let second = service.submit("https://example.com").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn distinct_urls_get_distinct_codes() {
        let service = test_service();

        let a = service.submit("https://example.com/a").await.unwrap();
        let b = service.submit("https://example.com/b").await.unwrap();

        assert_eq!(a.as_str(), "wh0000");
        assert_eq!(b.as_str(), "wh0001");
    }

    #[tokio::test]
    async fn submit_skips_codes_already_in_store() {
        let service = test_service();
        service
            .repository()
            .insert("https://squatter.example", &ShortCode::new_unchecked("wh0000"))
            .await
            .unwrap();

        let code = service.submit("https://example.com").await.unwrap();
        assert_eq!(code.as_str(), "wh0001");
    }

    #[tokio::test]
    async fn submit_with_empty_url_fails() {
        let service = test_service();

        for url in ["", "   ", "\n"] {
            let err = service.submit(url).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidUrl(_)));
        }
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn submit_stores_url_verbatim() {
        let service = test_service();

        let code = service.submit(" https://Example.com/Path ").await.unwrap();
        assert_eq!(
            service.resolve(code.as_str()).await.unwrap(),
            " https://Example.com/Path "
        );
    }

    #[tokio::test]
    async fn resolve_existing_code() {
        let service = test_service();

        let code = service.submit("https://example.com").await.unwrap();
        let url = service.resolve(code.as_str()).await.unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn resolve_unknown_code_is_not_found() {
        let service = test_service();

        let err = service.resolve("zzzzzz").await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(code) if code == "zzzzzz"));
    }

    #[tokio::test]
    async fn resolve_malformed_code_is_not_found() {
        let service = test_service();

        for code in ["", "ab", "abc-def", "../etc"] {
            let err = service.resolve(code).await.unwrap_err();
            assert!(matches!(err, ShortenerError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn lookup_returns_whole_link() {
        let service = test_service();

        let code = service.submit("https://example.com").await.unwrap();
        let link = service.lookup(code.as_str()).await.unwrap();

        assert_eq!(link.short_code, code);
        assert_eq!(link.original_url, "https://example.com");
        assert!(matches!(
            service.lookup("wh9999").await,
            Err(ShortenerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn exhausted_generator_surfaces_error() {
        let service = test_service();
        for (i, code) in ["wh0000", "wh0001", "wh0002"].into_iter().enumerate() {
            service
                .repository()
                .insert(&format!("https://seed/{i}"), &ShortCode::new_unchecked(code))
                .await
                .unwrap();
        }

        let err = service.submit("https://example.com").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::CodeSpaceExhausted { attempts: 3 }
        ));
    }
}
