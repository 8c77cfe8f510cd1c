//! File locking for cache directories.
//!
//! A clone or fetch+checkout sequence against a cached repository directory
//! must not race a second process doing the same. Each cached entry gets an
//! exclusive OS file lock, held for the duration of the network operation
//! and released when the lock object is dropped.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::constants::CACHE_LOCKS_SUBDIR;

/// An exclusive lock on one cached entry.
pub struct CacheLock {
    _file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Acquires an exclusive lock for a named cache entry.
    ///
    /// Lock files live at `{cache_root}/.locks/{entry_name}.lock`. The OS
    /// lock operation blocks until any holder releases it, so the blocking
    /// wait runs on `spawn_blocking` to keep the runtime free. There is no
    /// acquisition timeout.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use quill_contract::cache::lock::CacheLock;
    /// use std::path::Path;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let lock = CacheLock::acquire(Path::new("/home/user/.quill/contract/cache"), "github.com_company_repo.git").await?;
    /// // clone/fetch/checkout safely...
    /// drop(lock);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn acquire(cache_root: &Path, entry_name: &str) -> Result<Self> {
        let locks_dir = cache_root.join(CACHE_LOCKS_SUBDIR);
        tokio::fs::create_dir_all(&locks_dir).await.with_context(|| {
            format!("failed to create locks directory {}", locks_dir.display())
        })?;

        let lock_path = locks_dir.join(format!("{entry_name}.lock"));
        let lock_path_clone = lock_path.clone();
        let entry_name = entry_name.to_string();

        let file = tokio::task::spawn_blocking(move || -> Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&lock_path_clone)
                .with_context(|| {
                    format!("failed to open lock file: {}", lock_path_clone.display())
                })?;

            file.lock_exclusive()
                .with_context(|| format!("failed to acquire lock for: {entry_name}"))?;

            Ok(file)
        })
        .await
        .context("failed to spawn blocking task for lock acquisition")??;

        Ok(Self {
            _file: file,
            path: lock_path,
        })
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        // closing the file would release the lock anyway; unlock explicitly
        #[allow(unstable_name_collisions)]
        if let Err(e) = self._file.unlock() {
            tracing::warn!("failed to unlock {}: {}", self.path.display(), e);
        }
    }
}

/// Removes lock files older than `ttl_seconds`, returning how many were
/// removed. Stale locks accumulate when a process dies without releasing
/// them.
pub async fn cleanup_stale_locks(cache_root: &Path, ttl_seconds: u64) -> Result<usize> {
    use std::time::{Duration, SystemTime};
    use tokio::fs;

    let locks_dir = cache_root.join(CACHE_LOCKS_SUBDIR);
    if !locks_dir.exists() {
        return Ok(0);
    }

    let mut removed_count = 0;
    let now = SystemTime::now();
    let ttl_duration = Duration::from_secs(ttl_seconds);

    let mut entries =
        fs::read_dir(&locks_dir).await.context("failed to read locks directory")?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) != Some("lock") {
            continue;
        }

        let metadata = match fs::metadata(&path).await {
            Ok(m) => m,
            Err(_) => continue,
        };

        let modified = match metadata.modified() {
            Ok(t) => t,
            Err(_) => continue,
        };

        if let Ok(age) = now.duration_since(modified)
            && age > ttl_duration
        {
            // removal can fail if another process holds the lock; skip it
            if fs::remove_file(&path).await.is_ok() {
                removed_count += 1;
            }
        }
    }

    Ok(removed_count)
}
