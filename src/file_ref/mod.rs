//! File references: a location string paired with a SHA-256 integrity hash.
//!
//! A [`FileRef`] is how contract descriptors point at their parts. The
//! `location` is one of the three [`Location`](crate::location::Location)
//! kinds and the `hash` pins the content that was last seen there. Resolving
//! a reference turns it into a readable local file, pulling remote content
//! into the [`ContentCache`] first when the location is a Web URL or a Git
//! repository.
//!
//! # Resolution
//!
//! [`FileRef::resolve`] classifies the location and produces a reference
//! whose `local_path` points at the file on disk:
//!
//! - Local paths are made absolute and hashed in place.
//! - Web URLs are downloaded into the cache.
//! - Git URLs have their repository cloned or refreshed in the cache, and
//!   the in-repository path is joined onto the checkout.
//!
//! When the caller supplies an expected hash, a mismatch either fails the
//! resolution or logs a warning, depending on `check_hash`. References that
//! are relative to another reference are handled by
//! [`FileRef::resolve_relative`].
//!
//! # Example
//!
//! ```rust,no_run
//! use quill_contract::cache::ContentCache;
//! use quill_contract::file_ref::FileRef;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cache = ContentCache::open_default()?;
//! let template = FileRef::resolve(
//!     "git://github.com:quill/contracts.git/nda/template.md#v0.2.1",
//!     Some("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"),
//!     true,
//!     &cache,
//! )
//! .await?;
//! let content = template.read_to_string().await?;
//! # Ok(())
//! # }
//! ```

mod relative;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use url::Url;

use crate::cache::ContentCache;
use crate::core::QuillError;
use crate::git::GitUrl;
use crate::location::{Location, LocationKind};
use crate::utils::fs::normalize_path;

/// A reference to a file somewhere (local, Web or Git) together with the
/// SHA-256 hash of its content.
///
/// The `location` and `hash` fields are what descriptors serialize. The
/// local path is only populated once the reference has been resolved and is
/// never written back out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Where the file lives, in any of the supported location syntaxes.
    pub location: String,
    /// Hex-encoded SHA-256 hash of the file content.
    pub hash: String,
    /// Path of the resolved copy on the local filesystem. Empty until the
    /// reference has been resolved.
    #[serde(skip)]
    local_path: PathBuf,
}

impl FileRef {
    /// Creates an unresolved reference, as it would appear in a contract
    /// descriptor. Resolve it before trying to read through it.
    pub fn new(location: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            hash: hash.into(),
            local_path: PathBuf::new(),
        }
    }

    /// Creates a reference to a file on the local filesystem.
    ///
    /// The file is hashed and the location is stored as the lexically
    /// normalized absolute path, so two references to the same file through
    /// different relative spellings compare equal.
    pub async fn local(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let hash = hash_of_file(path).await?;
        let absolute = absolutize(path)?;
        Ok(Self {
            location: absolute.display().to_string(),
            hash,
            local_path: absolute,
        })
    }

    /// Resolves a location string into a readable reference, caching remote
    /// content as needed.
    ///
    /// If `expected_hash` is non-empty and differs from the hash of the
    /// resolved content, resolution fails when `check_hash` is set and logs
    /// a warning otherwise.
    pub async fn resolve(
        location: &str,
        expected_hash: Option<&str>,
        check_hash: bool,
        cache: &ContentCache,
    ) -> Result<Self> {
        Self::resolve_with_repo_hint(location, None, expected_hash, check_hash, cache).await
    }

    /// Like [`resolve`](Self::resolve), with an explicit repository boundary
    /// hint for Git locations whose repository path cannot be recognized
    /// from the URL alone.
    pub async fn resolve_with_repo_hint(
        location: &str,
        repo_segments: Option<usize>,
        expected_hash: Option<&str>,
        check_hash: bool,
        cache: &ContentCache,
    ) -> Result<Self> {
        debug!("Resolving file reference {location}");
        let file_ref = match Location::parse_with_repo_hint(location, repo_segments)? {
            Location::Local(path) => Self::local(&path).await?,
            Location::Web(url) => Self::from_web(&url, cache).await?,
            Location::Repository(git_url) => Self::from_repository(&git_url, cache).await?,
        };
        file_ref.verify_expected(expected_hash, check_hash)?;
        Ok(file_ref)
    }

    async fn from_web(url: &Url, cache: &ContentCache) -> Result<Self> {
        let cached = cache.from_web(url).await?;
        Self::cached(url.to_string(), cached.path).await
    }

    async fn from_repository(url: &GitUrl, cache: &ContentCache) -> Result<Self> {
        let cached = cache.from_repository(url).await?;
        Self::cached(url.to_string(), cached.path).await
    }

    /// Builds a reference whose content already sits in the cache.
    async fn cached(location: String, local_path: PathBuf) -> Result<Self> {
        let hash = hash_of_file(&local_path).await?;
        Ok(Self {
            location,
            hash,
            local_path,
        })
    }

    /// Compares the resolved hash against an expected one, if given.
    ///
    /// An empty expected hash means "not pinned yet" and always passes.
    fn verify_expected(&self, expected: Option<&str>, check_hash: bool) -> Result<()> {
        if let Some(expected) = expected.filter(|h| !h.is_empty()) {
            if expected != self.hash {
                if check_hash {
                    error!(
                        location = %self.location,
                        expected,
                        actual = %self.hash,
                        "File content does not match its expected hash"
                    );
                    return Err(QuillError::HashMismatch {
                        location: self.location.clone(),
                        expected: expected.to_string(),
                        actual: self.hash.clone(),
                    }
                    .into());
                }
                warn!(
                    location = %self.location,
                    expected,
                    actual = %self.hash,
                    "Hash for file has changed"
                );
            }
        }
        Ok(())
    }

    /// The kind of location this reference points at.
    pub fn kind(&self) -> LocationKind {
        LocationKind::of(&self.location)
    }

    /// Whether the location is relative to some other reference.
    ///
    /// A location counts as relative when it starts with a `.` or contains
    /// no path separator at all (a bare filename).
    pub fn is_relative(&self) -> bool {
        self.location.starts_with('.') || !self.location.contains(['/', '\\'])
    }

    /// Path of the resolved copy on the local filesystem.
    ///
    /// Empty for references that have not been resolved yet.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Recomputes the hash from the resolved file on disk, replacing the
    /// stored value.
    pub async fn refresh_hash(&mut self) -> Result<()> {
        self.hash = hash_of_file(&self.local_path).await?;
        Ok(())
    }

    /// Copies the resolved file to `dest`.
    pub async fn copy_to(&self, dest: &Path) -> Result<()> {
        let content = tokio::fs::read(&self.local_path)
            .await
            .with_context(|| format!("failed to read {}", self.local_path.display()))?;
        tokio::fs::write(dest, content)
            .await
            .with_context(|| format!("failed to write {}", dest.display()))?;
        Ok(())
    }

    /// Reads the resolved file as UTF-8 text.
    pub async fn read_to_string(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.local_path)
            .await
            .with_context(|| format!("failed to read {}", self.local_path.display()))
    }

    /// Reads the resolved file as raw bytes.
    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.local_path)
            .await
            .with_context(|| format!("failed to read {}", self.local_path.display()))
    }

    /// Final component of the resolved path.
    pub fn file_name(&self) -> String {
        self.local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory containing the resolved file.
    pub fn directory(&self) -> PathBuf {
        self.local_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Extension of the resolved file, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.local_path.extension().and_then(|e| e.to_str())
    }

    /// Expresses the resolved path relative to `base`.
    pub fn local_rel_path(&self, base: &Path) -> Result<PathBuf> {
        let base = absolutize(base)?;
        pathdiff::diff_paths(&self.local_path, &base).with_context(|| {
            format!(
                "cannot express {} relative to {}",
                self.local_path.display(),
                base.display()
            )
        })
    }
}

/// Computes the hex-encoded SHA-256 hash of a file's content.
pub async fn hash_of_file(path: &Path) -> Result<String> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    let hash = hex::encode(hasher.finalize());
    debug!("Computed hash of {} as {}", path.display(), hash);
    Ok(hash)
}

/// Makes a path absolute against the current directory and folds `.` and
/// `..` segments lexically, without consulting the filesystem.
fn absolutize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("failed to make {} absolute", path.display()))?;
    Ok(normalize_path(&absolute))
}
