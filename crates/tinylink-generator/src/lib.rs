//! Short code generation for tinylink.
//!
//! [`Generator`] implementations only draw candidates; [`CodeAllocator`]
//! turns a generator into a [`CodeFactory`](tinylink_core::CodeFactory) by
//! rejecting candidates the store already holds.

pub mod allocator;
pub mod error;
pub mod random;

pub use allocator::CodeAllocator;
pub use error::Error;
pub use random::{GeneratorSettings, RandomGenerator};

use tinylink_core::ShortCode;

/// Trait for drawing candidate short codes.
///
/// Implementations are pure generators that don't interact with storage,
/// so a candidate may already be taken.
pub trait Generator: Send + Sync + 'static {
    fn generate(&self) -> ShortCode;
}
