//! Integration tests for file reference resolution through the public API.

use anyhow::Result;
use tempfile::TempDir;

use quill_contract::cache::ContentCache;
use quill_contract::core::QuillError;
use quill_contract::file_ref::{FileRef, hash_of_file};

use crate::support::write_file;

#[tokio::test]
async fn test_resolve_local_location_end_to_end() -> Result<()> {
    let temp = TempDir::new()?;
    let path = write_file(temp.path(), "nda/params.json", r#"{"term": "1 year"}"#)?;
    let cache = ContentCache::open(temp.path().join("cache"))?;

    let expected = hash_of_file(&path).await?;
    let resolved = FileRef::resolve(
        &path.display().to_string(),
        Some(&expected),
        true,
        &cache,
    )
    .await?;

    assert_eq!(resolved.local_path(), path.as_path());
    assert_eq!(resolved.hash, expected);
    assert_eq!(resolved.read_to_string().await?, r#"{"term": "1 year"}"#);
    Ok(())
}

/// Resolution through dotted spellings lands on the same normalized path,
/// so the cache and descriptors never see two names for one file.
#[tokio::test]
async fn test_resolve_normalizes_dotted_spellings() -> Result<()> {
    let temp = TempDir::new()?;
    let path = write_file(temp.path(), "nda/params.json", "{}")?;
    let cache = ContentCache::open(temp.path().join("cache"))?;

    let dotted = temp.path().join("nda/../nda/./params.json");
    let resolved = FileRef::resolve(&dotted.display().to_string(), None, true, &cache).await?;
    assert_eq!(resolved.local_path(), path.as_path());
    Ok(())
}

#[tokio::test]
async fn test_resolve_relative_walks_between_directories() -> Result<()> {
    let temp = TempDir::new()?;
    let entry = write_file(temp.path(), "contracts/nda/contract.json", "{}")?;
    let styles = write_file(temp.path(), "contracts/shared/styles.css", "body {}")?;
    let cache = ContentCache::open(temp.path().join("cache"))?;

    let base = FileRef::resolve(&entry.display().to_string(), None, false, &cache).await?;
    let resolved = base
        .resolve_relative(&FileRef::new("../shared/styles.css", ""), true, &cache)
        .await?;
    assert_eq!(resolved.local_path(), styles.as_path());
    assert_eq!(resolved.hash, hash_of_file(&styles).await?);
    Ok(())
}

/// An absolute location handed to relative resolution is an input error,
/// reported as such rather than silently resolved.
#[tokio::test]
async fn test_resolve_relative_rejects_absolute_input() -> Result<()> {
    let temp = TempDir::new()?;
    let entry = write_file(temp.path(), "contract.json", "{}")?;
    let cache = ContentCache::open(temp.path().join("cache"))?;

    let base = FileRef::resolve(&entry.display().to_string(), None, false, &cache).await?;
    let err = base
        .resolve_relative(&FileRef::new("/etc/hosts", ""), true, &cache)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QuillError>(),
        Some(QuillError::NotRelative { .. })
    ));
    Ok(())
}

/// Web resolution surfaces connection failures as download errors instead
/// of leaving half-written cache entries behind.
#[tokio::test]
async fn test_web_resolution_fails_cleanly_when_unreachable() -> Result<()> {
    let temp = TempDir::new()?;
    let cache = ContentCache::open(temp.path().join("cache"))?;

    // nothing listens on port 1
    let err = FileRef::resolve("http://127.0.0.1:1/params.json", None, true, &cache)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<QuillError>(),
        Some(QuillError::DownloadFailed { .. })
    ));
    assert!(!temp.path().join("cache/web").join("127.0.0.1").exists());
    Ok(())
}
