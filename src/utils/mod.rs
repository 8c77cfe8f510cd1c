//! Shared utilities
//!
//! # Modules
//!
//! - [`fs`] - File system operations with atomic writes and the directory
//!   existence check the cache layout is built on
//! - [`platform`] - Platform differences in external command discovery
//!
//! # Example
//!
//! ```rust,no_run
//! use quill_contract::utils::{ensure_dir, atomic_write};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("cache/web/example.com"))?;
//! atomic_write(Path::new("cache/web/example.com/params.json"), b"{}")?;
//! # Ok(())
//! # }
//! ```

pub mod fs;
pub mod platform;

pub use fs::{atomic_write, dir_exists, ensure_dir, ensure_parent_dir, normalize_path};
pub use platform::command_exists;
