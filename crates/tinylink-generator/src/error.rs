use thiserror::Error;

/// Errors returned when constructing generators and allocators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid code length {length}; expected {min}..={max}")]
    InvalidLength {
        length: usize,
        min: usize,
        max: usize,
    },
    #[error("max attempts must be at least 1")]
    ZeroAttempts,
}
