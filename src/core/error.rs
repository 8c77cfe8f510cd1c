//! Error handling for quill-contract
//!
//! This module provides the typed error surface of the resolution and caching
//! subsystem. The design pairs two layers:
//! 1. **Strongly-typed errors** ([`QuillError`]) for the failure modes callers
//!    match on (hash mismatches, parse failures, repository escapes)
//! 2. **`anyhow` composition** at the operation level, attaching which
//!    location and which operation failed via `.with_context(...)`
//!
//! # Error Categories
//!
//! - **Location parsing**: [`QuillError::LocationParse`] for strings that
//!   match no known grammar for their classified scheme
//! - **Relative resolution**: [`QuillError::NotRelative`],
//!   [`QuillError::PathEscapesRepository`]
//! - **Integrity**: [`QuillError::HashMismatch`], raised only under strict
//!   checking and never downgraded to a warning
//! - **Cache fetching**: [`QuillError::GitCloneFailed`],
//!   [`QuillError::GitCheckoutFailed`], [`QuillError::GitCommandError`],
//!   [`QuillError::DownloadFailed`], each carrying the underlying subprocess
//!   or HTTP failure
//! - **Bounded execution**: [`QuillError::CommandTimeout`] for external
//!   invocations that exceed their time budget
//! - **Formats**: [`QuillError::UnsupportedFormat`] where a format-specific
//!   parse is required downstream
//!
//! # Error Conversion
//!
//! [`std::io::Error`] converts automatically into [`QuillError::IoError`];
//! everything else is constructed at the failure site with its context.
//!
//! # Examples
//!
//! ```rust,no_run
//! use quill_contract::core::QuillError;
//!
//! fn report(error: &QuillError) {
//!     match error {
//!         QuillError::HashMismatch { location, expected, actual } => {
//!             eprintln!("integrity failure on {location}: expected {expected}, got {actual}");
//!         }
//!         QuillError::GitNotFound => {
//!             eprintln!("git is required for repository locations");
//!         }
//!         other => eprintln!("{other}"),
//!     }
//! }
//! ```

use thiserror::Error;

/// The main error type for location resolution and caching operations.
///
/// Each variant represents a specific failure mode and carries the context a
/// caller needs to act on it: the offending location string, the URL being
/// fetched, or the subprocess output.
#[derive(Error, Debug)]
pub enum QuillError {
    /// A location string matched no known grammar for its classified scheme
    ///
    /// Classification is a prefix heuristic, so strings such as
    /// `github.com/org/repo` (no scheme separator) classify as repository
    /// locations and then fail here.
    ///
    /// # Fields
    /// - `location`: the raw location string
    /// - `reason`: which grammar rejected it and why
    #[error("Cannot parse location '{location}': {reason}")]
    LocationParse {
        /// The raw location string that failed to parse
        location: String,
        /// Which grammar rejected it and why
        reason: String,
    },

    /// Relative resolution was attempted with a non-relative location
    #[error("Supplied location is not relative: {location}")]
    NotRelative {
        /// The location that was expected to be relative
        location: String,
    },

    /// A relative path's `..` segments climb above the repository root
    #[error("Relative path escapes the repository: {relative}")]
    PathEscapesRepository {
        /// The relative location whose `..` segments exceed the base depth
        relative: String,
    },

    /// Content hash disagrees with the declared hash under strict checking
    ///
    /// Always fatal to the current resolution. Content that does not match
    /// its declared hash must never be used for signing or compiling.
    ///
    /// # Fields
    /// - `location`: the resolved location whose content was hashed
    /// - `expected`: the declared SHA-256 hex digest
    /// - `actual`: the digest computed from the resolved bytes
    #[error("Hash mismatch for '{location}': expected {expected}, got {actual}")]
    HashMismatch {
        /// The resolved location whose content was hashed
        location: String,
        /// The declared SHA-256 hex digest
        expected: String,
        /// The digest computed from the resolved bytes
        actual: String,
    },

    /// Git executable not found in PATH
    ///
    /// Repository locations require the system `git` binary for clone, fetch
    /// and checkout.
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// A git command returned a non-zero exit code
    ///
    /// # Fields
    /// - `operation`: the git operation that failed (e.g. "fetch", "pull")
    /// - `stderr`: the error output from the git command
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g. "fetch", "pull")
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Cloning a repository into the cache failed
    #[error("Failed to clone repository: {url}")]
    GitCloneFailed {
        /// The clone URL that failed
        url: String,
        /// The reason for the clone failure
        reason: String,
    },

    /// Checking out a ref in a cached repository failed
    #[error("Failed to checkout reference '{reference}' in repository")]
    GitCheckoutFailed {
        /// The git reference (branch, tag, or commit) that failed to checkout
        reference: String,
        /// The reason for the checkout failure
        reason: String,
    },

    /// Downloading a web location into the cache failed
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed {
        /// The URL that could not be downloaded
        url: String,
        /// HTTP status or transport failure description
        reason: String,
    },

    /// An external invocation exceeded its time budget
    ///
    /// Clone, fetch, checkout and download are the only operations that can
    /// hang indefinitely; each is bounded and reports expiry through this
    /// variant rather than a generic command failure.
    #[error("Operation '{operation}' timed out after {seconds}s")]
    CommandTimeout {
        /// The operation that was cut off
        operation: String,
        /// The budget that was exceeded, in seconds
        seconds: u64,
    },

    /// File extension unrecognized where a format-specific parse is required
    #[error("Unrecognized contract format with extension '{extension}' for {path}")]
    UnsupportedFormat {
        /// Path of the file whose format could not be determined
        path: String,
        /// The unrecognized extension (possibly empty)
        extension: String,
    },

    /// File system error
    #[error("File system error: {operation} on {path}")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
        /// Path where the file system error occurred
        path: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}
