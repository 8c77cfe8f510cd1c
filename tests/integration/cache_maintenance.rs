//! Integration tests for cache root handling and lock maintenance.

use anyhow::Result;
use std::env;
use std::time::Duration;
use tempfile::TempDir;

use quill_contract::cache::{CacheLock, ContentCache, cleanup_stale_locks};
use quill_contract::constants::{CACHE_LOCKS_SUBDIR, ENV_CACHE_DIR};

#[tokio::test]
async fn test_open_creates_missing_cache_root() -> Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path().join("deep/nested/cache");
    let cache = ContentCache::open(&root)?;
    assert_eq!(cache.root(), root.as_path());
    assert!(root.is_dir());
    Ok(())
}

/// `QUILL_CACHE_DIR` redirects the default cache root.
#[tokio::test]
#[serial_test::serial]
async fn test_open_default_honors_cache_dir_override() -> Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path().join("override-cache");
    unsafe {
        env::set_var(ENV_CACHE_DIR, &root);
    }
    let cache = ContentCache::open_default()?;
    unsafe {
        env::remove_var(ENV_CACHE_DIR);
    }
    assert_eq!(cache.root(), root.as_path());
    assert!(root.is_dir());
    Ok(())
}

/// Released lock files older than the TTL are swept; younger ones stay.
#[tokio::test]
async fn test_stale_lock_sweep_spares_recent_locks() -> Result<()> {
    let temp = TempDir::new()?;
    let root = temp.path().to_path_buf();

    drop(CacheLock::acquire(&root, "old_entry").await?);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    drop(CacheLock::acquire(&root, "fresh_entry").await?);

    let removed = cleanup_stale_locks(&root, 1).await?;
    assert_eq!(removed, 1);

    let locks_dir = root.join(CACHE_LOCKS_SUBDIR);
    assert!(!locks_dir.join("old_entry.lock").exists());
    assert!(locks_dir.join("fresh_entry.lock").exists());
    Ok(())
}

#[tokio::test]
async fn test_sweeping_a_cache_without_locks_is_a_no_op() -> Result<()> {
    let temp = TempDir::new()?;
    let removed = cleanup_stale_locks(temp.path(), 0).await?;
    assert_eq!(removed, 0);
    Ok(())
}
