//! Home and cache directory resolution.
//!
//! The library takes its cache root explicitly ([`crate::cache::ContentCache`]
//! is constructed with a path); these helpers only compute the defaults a
//! caller passes in.
//!
//! # Location Priority
//!
//! Tool home:
//! 1. `QUILL_CONTRACT_HOME` environment variable (if set, `~` expanded)
//! 2. `~/.quill/contract`
//!
//! Cache root:
//! 1. `QUILL_CACHE_DIR` environment variable (if set, `~` expanded)
//! 2. `<tool home>/cache`

use anyhow::Result;
use std::path::PathBuf;

use crate::constants::{DEFAULT_HOME_RELATIVE, ENV_CACHE_DIR, ENV_CONTRACT_HOME};

/// Resolves the tool home directory.
///
/// # Errors
///
/// Returns an error if no override is set and the user's home directory
/// cannot be determined.
pub fn contract_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONTRACT_HOME) {
        return Ok(PathBuf::from(shellexpand::tilde(&dir).into_owned()));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;
    Ok(home.join(DEFAULT_HOME_RELATIVE))
}

/// Resolves the default cache root directory.
///
/// The directory is not created here; [`crate::cache::ContentCache::open`]
/// creates it on first use.
///
/// # Examples
///
/// ```rust,no_run
/// use quill_contract::config::default_cache_dir;
///
/// # fn example() -> anyhow::Result<()> {
/// let cache = default_cache_dir()?;
/// println!("Cache root: {}", cache.display());
/// # Ok(())
/// # }
/// ```
pub fn default_cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CACHE_DIR) {
        return Ok(PathBuf::from(shellexpand::tilde(&dir).into_owned()));
    }
    Ok(contract_home()?.join("cache"))
}
