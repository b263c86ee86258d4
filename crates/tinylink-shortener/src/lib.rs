//! URL shortener service implementation.
//!
//! [`ShortenerService`] wires a link store to a code allocator and exposes
//! them through the [`Shortener`](tinylink_core::Shortener) trait. Core
//! types are re-exported from `tinylink_core`.

pub mod service;

pub use service::ShortenerService;
pub use tinylink_core::{Shortener, ShortenerError};
