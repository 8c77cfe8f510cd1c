//! File system utilities shared by the cache and contract modules.
//!
//! Small, deliberately boring helpers: directory creation, an atomic
//! write-then-rename, and the existence check the cache layout relies on.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::core::QuillError;

/// Ensures a directory exists, creating it and any parents if necessary.
///
/// # Arguments
///
/// * `path` - The directory path to create
///
/// # Returns
///
/// - `Ok(())` if the directory exists or was successfully created
/// - `Err` if the path exists but is not a directory, or creation fails
///
/// # Examples
///
/// ```rust
/// use quill_contract::utils::fs::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// ensure_dir(Path::new("cache/git/github.com"))?;
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(QuillError::FileSystemError {
            operation: "create directory".to_string(),
            path: path.display().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Ensures the parent directory of a file path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// Content goes to a sibling `.tmp` file first, is synced, and is then
/// renamed into place, so readers never observe a partially written file.
/// Parent directories are created automatically.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    ensure_parent_dir(path)?;
    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;
        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;
    Ok(())
}

/// Reports whether a directory exists at `path`.
///
/// A plain file at `path` is an error rather than `false`: the cache derives
/// its existence checks from this and a file squatting on a checkout location
/// means the cache tree is corrupt, not merely absent.
pub fn dir_exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(true),
        Ok(_) => Err(QuillError::FileSystemError {
            operation: "expected a directory".to_string(),
            path: path.display().to_string(),
        }
        .into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Normalizes a path lexically, without touching the filesystem.
///
/// `.` components are dropped and `..` folds into the preceding named
/// component. A `..` that would climb past the root (or past the start of a
/// relative path) is discarded rather than kept, which matches how file
/// references treat paths that have already been made absolute.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            c => components.push(c),
        }
    }
    components.iter().collect()
}
