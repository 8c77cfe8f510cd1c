//! Core types for quill-contract
//!
//! The foundation the rest of the crate builds on: the strongly-typed error
//! surface and its conversions. Higher layers compose these with
//! [`anyhow::Result`] so every failure reaches the caller annotated with the
//! location and operation that produced it.
//!
//! # Modules
//!
//! - [`error`] - [`QuillError`] and automatic conversions from common library
//!   errors
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use quill_contract::core::QuillError;
//! use anyhow::{Context, Result};
//!
//! fn read_descriptor(path: &std::path::Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read descriptor at {}", path.display()))
//! }
//!
//! fn classify_failure(err: &anyhow::Error) -> bool {
//!     // typed variants stay matchable through the anyhow chain
//!     err.downcast_ref::<QuillError>()
//!         .is_some_and(|e| matches!(e, QuillError::HashMismatch { .. }))
//! }
//! ```

pub mod error;

pub use error::QuillError;
