//! Content-addressed cache of remote files.
//!
//! [`ContentCache`] owns a cache root on the local filesystem and materializes
//! remote content under it:
//!
//! ```text
//! {root}/
//! ├── git/{host}/{repo-path}/     live Git checkouts
//! ├── web/{host}/{url-path}       downloaded files
//! └── .locks/                     per-entry lock files
//! ```
//!
//! The directory layout is part of the on-disk contract: the existence of a
//! checkout directory is the only "is it cached" state, and the tree must
//! stay stable across restarts. There is no index file.
//!
//! # Freshness model
//!
//! Resolution is idempotent but never free. A repository that is already
//! cached still gets a `git fetch` of the requested ref and a checkout on
//! every resolution, and a web file is re-downloaded every time, so stale
//! local state is never silently served. Each returned [`CachedPath`] says
//! which network operation paid for it, letting callers batch or skip
//! redundant resolutions.
//!
//! # Concurrency
//!
//! The clone/fetch/checkout sequence is not safe to run concurrently against
//! one checkout directory. The cache serializes per repository directory at
//! two levels: an in-process async mutex covering tasks in this process, and
//! a [`CacheLock`] file lock covering other processes. Resolutions of
//! different repositories proceed in parallel.
//!
//! # Examples
//!
//! ```rust,no_run
//! use quill_contract::cache::ContentCache;
//! use quill_contract::git::GitUrl;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cache = ContentCache::open_default()?;
//! let url = GitUrl::parse("git://github.com:company/contracts.git/terms.md#v0.2")?;
//! let cached = cache.from_repository(&url).await?;
//! println!("{} ({:?})", cached.path.display(), cached.network);
//! # Ok(())
//! # }
//! ```

pub mod lock;
pub mod web;

pub use lock::{CacheLock, cleanup_stale_locks};

use anyhow::{Context, Result};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use crate::config::default_cache_dir;
use crate::constants::{CACHE_GIT_SUBDIR, CACHE_WEB_SUBDIR, DEFAULT_OPERATION_TIMEOUT};
use crate::git::{GitRepo, GitUrl, ensure_git_available};
use crate::utils::fs::{dir_exists, ensure_dir, ensure_parent_dir};

/// The network operation a resolution performed.
///
/// Every successful resolution performs exactly one of these; nothing is
/// ever served from local state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkActivity {
    /// The repository was not cached yet and was cloned (then fetched and
    /// checked out).
    Cloned,
    /// The repository was already cached; the requested ref was fetched and
    /// checked out.
    Fetched,
    /// The file was downloaded over HTTP.
    Downloaded,
}

/// A path inside the cache, along with the network operation that
/// produced or refreshed it.
#[derive(Debug, Clone)]
pub struct CachedPath {
    /// Local filesystem path to the requested file or directory.
    pub path: PathBuf,
    /// What the resolution cost on the network.
    pub network: NetworkActivity,
}

/// Local filesystem cache of remote Git checkouts and web downloads.
///
/// Construct one per process and pass it by reference to resolution calls.
#[derive(Debug)]
pub struct ContentCache {
    /// Cache root directory.
    root: PathBuf,
    /// Shared HTTP client for web downloads.
    client: reqwest::Client,
    /// In-process serialization of network operations per repository
    /// directory. The file lock in [`lock`] covers other processes.
    fetch_locks: DashMap<PathBuf, Arc<Mutex<()>>>,
    /// Bound on each external operation (clone, fetch, checkout, download).
    op_timeout: Duration,
}

impl ContentCache {
    /// Opens a cache rooted at the given directory, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_timeout(root, DEFAULT_OPERATION_TIMEOUT)
    }

    /// Opens the cache at the default location (see
    /// [`default_cache_dir`](crate::config::default_cache_dir)).
    pub fn open_default() -> Result<Self> {
        Self::open(default_cache_dir()?)
    }

    /// Opens a cache with a custom bound on external operations.
    pub fn with_timeout(root: impl Into<PathBuf>, op_timeout: Duration) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        tracing::debug!("Opened content cache at {}", root.display());
        Ok(Self {
            root,
            client: reqwest::Client::new(),
            fetch_locks: DashMap::new(),
            op_timeout,
        })
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensures the repository named by `url` is cached and checked out at
    /// the requested ref, returning the local path to the in-repo file or
    /// folder the URL names (the checkout root when it names none).
    ///
    /// The checkout lives at `{root}/git/{host}/{repo-path}` and is keyed by
    /// the canonical clone URL only; resolving the same repository at two
    /// refs reuses one checkout, switching it between refs. A missing
    /// repository is cloned; a cached one is fetched. Either way the
    /// requested ref (default branch name when the URL names none) is
    /// fetched from `origin` and checked out, and a branch left behind its
    /// remote is pulled up to date.
    ///
    /// The returned path is not guaranteed to exist: a URL naming a file
    /// absent from the checkout resolves to a path whose absence the caller
    /// discovers on read.
    pub async fn from_repository(&self, url: &GitUrl) -> Result<CachedPath> {
        tracing::debug!("Looking up cached entry for Git URL: {}", url);
        let repo_dir = self.repository_dir(url);
        let network = self
            .sync_repository(
                &url.clone_url(),
                &repo_dir,
                url.reference_or_default(),
                &repository_lock_name(url),
            )
            .await
            .with_context(|| format!("failed to cache Git repository {}", url.repo_url()))?;

        let mut path = repo_dir;
        push_segments(&mut path, &url.path);
        Ok(CachedPath {
            path,
            network,
        })
    }

    /// Downloads the file at `url` into the cache and returns its local
    /// path. Always re-downloads; there is no freshness check.
    pub async fn from_web(&self, url: &Url) -> Result<CachedPath> {
        let dest = self.web_path(url);
        web::download_file(&self.client, url, &dest, self.op_timeout).await?;
        Ok(CachedPath {
            path: dest,
            network: NetworkActivity::Downloaded,
        })
    }

    /// Brings a checkout directory up to date with its upstream: clone if
    /// the directory does not exist, then fetch and checkout `ref_name`.
    /// Serialized per directory, in-process and across processes.
    async fn sync_repository(
        &self,
        clone_url: &str,
        repo_dir: &Path,
        ref_name: &str,
        lock_name: &str,
    ) -> Result<NetworkActivity> {
        ensure_git_available()?;

        let guard = self
            .fetch_locks
            .entry(repo_dir.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = guard.lock().await;
        let _file_lock = CacheLock::acquire(&self.root, lock_name).await?;

        let network = if dir_exists(repo_dir)? {
            tracing::debug!("Repository already cached at {}", repo_dir.display());
            NetworkActivity::Fetched
        } else {
            tracing::debug!("Repository {} has not yet been cached", clone_url);
            ensure_parent_dir(repo_dir)?;
            GitRepo::clone_with_timeout(clone_url, repo_dir, self.op_timeout).await?;
            NetworkActivity::Cloned
        };

        let repo = GitRepo::new(repo_dir).with_timeout(self.op_timeout);
        repo.fetch_ref(ref_name).await?;
        repo.checkout_ref(ref_name).await?;
        Ok(network)
    }

    /// The checkout directory for a repository, `{root}/git/{host}/{repo}`.
    fn repository_dir(&self, url: &GitUrl) -> PathBuf {
        let mut dir = self.root.join(CACHE_GIT_SUBDIR).join(&url.host);
        push_segments(&mut dir, &url.repo_path);
        dir
    }

    /// The download destination for a web URL, `{root}/web/{host}/{path}`.
    fn web_path(&self, url: &Url) -> PathBuf {
        let mut dest = self.root.join(CACHE_WEB_SUBDIR).join(url.host_str().unwrap_or_default());
        if let Some(segments) = url.path_segments() {
            for segment in segments.filter(|s| !s.is_empty()) {
                dest.push(segment);
            }
        }
        dest
    }
}

/// Appends slash-separated segments onto a path, platform-safely.
fn push_segments(path: &mut PathBuf, segments: &str) {
    for segment in segments.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
}

/// Lock file name for a repository entry, derived from host and repo path.
fn repository_lock_name(url: &GitUrl) -> String {
    format!("{}_{}", url.host, url.repo_path).replace('/', "_")
}
