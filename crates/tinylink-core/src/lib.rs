//! Core types and traits for the tinylink URL shortener.
//!
//! This crate defines the link data model, the repository contract that
//! storage backends implement (including the atomic get-or-create
//! sequence), and the [`Shortener`] facade consumed by outer layers.

pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use error::{ShortenerError, StorageError, UniqueKey};
pub use repository::{CodeFactory, Link, ReadRepository, Repository};
pub use shortcode::ShortCode;
pub use shortener::Shortener;
