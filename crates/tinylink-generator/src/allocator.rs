use crate::error::Error;
use crate::random::{GeneratorSettings, RandomGenerator};
use crate::Generator;
use async_trait::async_trait;
use std::sync::Arc;
use tinylink_core::{CodeFactory, ReadRepository, ShortCode, ShortenerError};
use tracing::{debug, warn};

/// Allocates unused short codes by rejection sampling.
///
/// Each round draws a candidate from the generator and keeps it if it is
/// not reserved and the store does not know it yet. After `max_attempts` rejected candidates it
/// fails with [`ShortenerError::CodeSpaceExhausted`] instead of looping.
///
/// The check is advisory: a concurrent writer can still take the code
/// before it is inserted, which the store reports as a duplicate key.
#[derive(Debug)]
pub struct CodeAllocator<R, G> {
    repository: Arc<R>,
    generator: G,
    max_attempts: u32,
}

impl<R: ReadRepository> CodeAllocator<R, RandomGenerator> {
    /// Creates an allocator drawing random codes as described by `settings`.
    pub fn random(repository: Arc<R>, settings: GeneratorSettings) -> Result<Self, Error> {
        settings.validate()?;
        let generator = RandomGenerator::new(settings.length)?;
        Self::new(repository, generator, settings.max_attempts)
    }
}

impl<R: ReadRepository, G: Generator> CodeAllocator<R, G> {
    pub fn new(repository: Arc<R>, generator: G, max_attempts: u32) -> Result<Self, Error> {
        if max_attempts == 0 {
            return Err(Error::ZeroAttempts);
        }
        Ok(Self {
            repository,
            generator,
            max_attempts,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns a code that is not present in the store at the time of the check.
    pub async fn allocate(&self) -> Result<ShortCode, ShortenerError> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generator.generate();

            if candidate.is_reserved() {
                debug!(code = %candidate, attempt, "short code is reserved");
                continue;
            }

            if !self.repository.code_exists(&candidate).await? {
                debug!(code = %candidate, attempt, "allocated short code");
                return Ok(candidate);
            }

            debug!(code = %candidate, attempt, "short code already taken");
        }

        warn!(attempts = self.max_attempts, "gave up looking for a free short code");
        Err(ShortenerError::CodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}

#[async_trait]
impl<R: ReadRepository, G: Generator> CodeFactory for CodeAllocator<R, G> {
    async fn fresh_code(&self) -> Result<ShortCode, ShortenerError> {
        self.allocate().await
    }
}
