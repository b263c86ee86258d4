use crate::error::Error;
use crate::Generator;
use rand::Rng;
use tinylink_core::shortcode::{ALPHABET, MAX_LENGTH, MIN_LENGTH};
use tinylink_core::ShortCode;
use typed_builder::TypedBuilder;

pub const DEFAULT_LENGTH: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Configures short code generation and allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct GeneratorSettings {
    /// Number of symbols in every generated code.
    #[builder(default = DEFAULT_LENGTH)]
    pub length: usize,
    /// How many candidates the allocator draws before giving up.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GeneratorSettings {
    pub fn validate(&self) -> Result<(), Error> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(Error::InvalidLength {
                length: self.length,
                min: MIN_LENGTH,
                max: MAX_LENGTH,
            });
        }
        if self.max_attempts == 0 {
            return Err(Error::ZeroAttempts);
        }
        Ok(())
    }
}

/// Draws codes uniformly at random from the 62-symbol alphabet.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    pub fn new(length: usize) -> Result<Self, Error> {
        GeneratorSettings::builder()
            .length(length)
            .build()
            .validate()?;
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortCode {
        let mut rng = rand::rng();
        let code: String = (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        ShortCode::new_unchecked(code)
    }
}
