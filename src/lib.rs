//! Quill Contract - location resolution and content-addressed caching
//!
//! The plumbing layer of the Quill contracting tool: it resolves the
//! location strings found in contract descriptors (local paths, web URLs,
//! Git pseudo-URLs) into verified local files, keeping remote content in a
//! per-user cache and enforcing SHA-256 integrity on everything a contract
//! points at.
//!
//! # Architecture Overview
//!
//! Quill Contract follows a resolve-then-verify model where:
//! - A contract descriptor names its parts (parameters, template, upstream)
//!   as location strings paired with content hashes
//! - Remote content is fetched once into `~/.quill/contract/cache` and
//!   refreshed by Git fetch/checkout rather than re-downloaded wholesale
//! - Every resolved file is re-hashed and compared against the hash the
//!   descriptor pinned, so tampered or drifted content is caught before use
//!
//! ## Key Behaviors
//!
//! - **Three addressing schemes**: local filesystem paths, `http(s)://`
//!   URLs, and `git://` / `git+https://` pseudo-URLs naming a file inside a
//!   repository at a ref
//! - **Content-addressed cache**: repositories live under
//!   `{cache}/git/{host}/{repo}`, downloads under `{cache}/web/{host}/...`,
//!   so repeated resolutions of the same location share one copy
//! - **Relative resolution**: a descriptor fetched from a repository can
//!   point at its neighbours with `./` and `../` paths, which resolve
//!   within the same repository and never out of it
//! - **System git**: repository operations shell out to the installed `git`
//!   binary (like Cargo), inheriting the user's SSH and credential setup
//!
//! # Core Modules
//!
//! ## Core Functionality
//! - [`cache`] - Content cache: Git repository sync and web downloads
//! - [`config`] - Tool home and cache root resolution with env overrides
//! - [`core`] - Core error types shared across the crate
//!
//! ## Location Handling
//! - [`location`] - Location classification and the parsed [`Location`] sum type
//! - [`git`] - Git pseudo-URL grammar and operations wrapper over system git
//!
//! ## Contract Data
//! - [`file_ref`] - Hash-verified file references and relative resolution
//! - [`contract`] - Contract descriptor model, loading and hash updates
//!
//! ## Supporting Modules
//! - [`constants`] - Defaults: ports, ref names, env var names, timeouts
//! - [`utils`] - Filesystem helpers and platform detection
//!
//! # Location Syntax
//!
//! ```text
//! /home/user/contracts/nda/contract.json                            local path
//! ./params.json                                                     relative (to another reference)
//! https://example.com/contracts/params.json                         web URL
//! git://github.com:acme/contracts.git/nda/contract.json#v1.0.0     Git over SSH
//! git+https://github.com/acme/contracts.git/nda/contract.json      Git over HTTPS
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use quill_contract::cache::ContentCache;
//! use quill_contract::contract::Contract;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cache = ContentCache::open_default()?;
//! let contract = Contract::load(
//!     "git://github.com:acme/contracts.git/nda/contract.json#v1.0.0",
//!     &cache,
//! )
//! .await?;
//! println!("params file: {}", contract.params.local_path().display());
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod cache;
pub mod config;
pub mod constants;
pub mod core;

// Location handling and Git integration
pub mod git;
pub mod location;

// Contract data model
pub mod contract;
pub mod file_ref;

// Supporting modules
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::cache::{CachedPath, ContentCache, NetworkActivity};
pub use crate::contract::Contract;
pub use crate::core::QuillError;
pub use crate::file_ref::FileRef;
pub use crate::git::GitUrl;
pub use crate::location::{Location, LocationKind};
