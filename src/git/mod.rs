//! Git operations backing the content cache.
//!
//! This module shells out to the system `git` binary rather than embedding a
//! Git library. Using the CLI keeps resolution compatible with whatever
//! authentication the user already has working: SSH agents, credential
//! helpers, per-host configuration. Everything a private contract repository
//! needs is already set up if `git clone` works in a terminal.
//!
//! [`GitUrl`] handles the pseudo-URL grammar, [`GitCommand`] the subprocess
//! plumbing, and [`GitRepo`] the handful of repository operations the cache
//! performs: clone, fetch a ref, check it out, and pull when the checked-out
//! branch has fallen behind its remote.
//!
//! # Examples
//!
//! ```rust,no_run
//! use quill_contract::git::GitRepo;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repo = GitRepo::clone("git@github.com:company/contracts.git", "/tmp/contracts").await?;
//! repo.fetch_ref("v0.4").await?;
//! repo.checkout_ref("v0.4").await?;
//! # Ok(())
//! # }
//! ```

pub mod command_builder;
pub mod url;

pub use command_builder::{GitCommand, GitCommandOutput};
pub use url::{GitProtocol, GitUrl};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::DEFAULT_OPERATION_TIMEOUT;
use crate::core::QuillError;
use crate::utils::platform::{command_exists, get_git_command};

/// Phrase Git prints when a checked-out branch is behind its remote and can
/// be brought up to date with a pull. The wording after "to" differs between
/// Git versions ("merge the remote branch" vs "update your local branch"),
/// so only the stable prefix is matched.
const PULL_HINT: &str = "use \"git pull\" to";

/// Handle to a local Git checkout.
#[derive(Debug)]
pub struct GitRepo {
    path: PathBuf,
    /// Bound applied to every command run against this checkout.
    timeout: Duration,
}

impl GitRepo {
    /// Creates a handle for an existing local checkout. The path is not
    /// validated here; operations fail later if it is not a repository.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Overrides the per-command timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Clones a repository to a local path and returns a handle to it.
    pub async fn clone(clone_url: &str, target: impl AsRef<Path>) -> Result<Self> {
        Self::clone_with_timeout(clone_url, target, DEFAULT_OPERATION_TIMEOUT).await
    }

    /// Clones with a custom bound on the clone operation, which the returned
    /// handle keeps for subsequent commands.
    pub async fn clone_with_timeout(
        clone_url: &str,
        target: impl AsRef<Path>,
        timeout: Duration,
    ) -> Result<Self> {
        let target_path = target.as_ref();
        tracing::info!(target: "git", "Cloning {} to {}", clone_url, target_path.display());
        GitCommand::clone(clone_url, target_path)
            .with_timeout(Some(timeout))
            .execute()
            .await?;
        Ok(Self::new(target_path).with_timeout(timeout))
    }

    /// The checkout's root directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the path looks like a Git repository.
    pub fn is_git_repo(&self) -> bool {
        self.path.join(".git").exists()
    }

    /// Fetches a single ref (branch, tag or commit) from the `origin` remote.
    pub async fn fetch_ref(&self, ref_name: &str) -> Result<()> {
        tracing::debug!(
            target: "git",
            "Fetching ref \"{}\" into {}",
            ref_name,
            self.path.display()
        );
        GitCommand::fetch_ref(ref_name)
            .current_dir(&self.path)
            .with_timeout(Some(self.timeout))
            .execute_success()
            .await
            .with_context(|| {
                format!("failed to fetch \"{}\" into {}", ref_name, self.path.display())
            })
    }

    /// Checks out a ref, pulling afterwards when Git reports the checked-out
    /// branch is behind its remote.
    ///
    /// A plain pull on every resolution would break pinning to a specific
    /// commit or tag, so the pull only happens when the checkout output asks
    /// for one, which only branches do.
    pub async fn checkout_ref(&self, ref_name: &str) -> Result<()> {
        tracing::debug!(
            target: "git",
            "Checking out \"{}\" in {}",
            ref_name,
            self.path.display()
        );
        let output = GitCommand::checkout(ref_name)
            .current_dir(&self.path)
            .with_timeout(Some(self.timeout))
            .execute()
            .await
            .with_context(|| {
                format!("failed to checkout \"{}\" in {}", ref_name, self.path.display())
            })?;
        // the behind-remote notice lands on stdout, the branch switch notice
        // on stderr; look at both
        if output.stdout.contains(PULL_HINT) || output.stderr.contains(PULL_HINT) {
            self.pull().await?;
        }
        Ok(())
    }

    /// Lists local branches, returning all branch names and the active one.
    pub async fn list_branches(&self) -> Result<(Vec<String>, String)> {
        let output = GitCommand::list_local_branches()
            .current_dir(&self.path)
            .with_timeout(Some(self.timeout))
            .execute_stdout()
            .await?;
        let mut branches = Vec::new();
        let mut active_branch = String::new();
        for line in output.lines() {
            if let Some(rest) = line.strip_prefix('*') {
                active_branch = rest.trim().split(' ').next().unwrap_or_default().to_string();
                branches.push(active_branch.clone());
                continue;
            }
            let branch = line.trim();
            if !branch.is_empty() {
                branches.push(branch.to_string());
            }
        }
        if active_branch.is_empty() {
            return Err(QuillError::GitCommandError {
                operation: "branch".to_string(),
                stderr: format!("no active branch in repository {}", self.path.display()),
            }
            .into());
        }
        tracing::debug!(
            target: "git",
            "Detected active branch \"{}\" in {}",
            active_branch,
            self.path.display()
        );
        Ok((branches, active_branch))
    }

    /// Pulls the active branch from the `origin` remote.
    pub async fn pull(&self) -> Result<()> {
        let (_, active_branch) = self.list_branches().await?;
        tracing::debug!(
            target: "git",
            "Pulling \"{}\" from origin into {}",
            active_branch,
            self.path.display()
        );
        GitCommand::pull(&active_branch)
            .current_dir(&self.path)
            .with_timeout(Some(self.timeout))
            .execute_success()
            .await
            .with_context(|| {
                format!("failed to pull branch \"{}\" from origin", active_branch)
            })
    }

    /// The commit hash HEAD currently points at.
    pub async fn current_commit(&self) -> Result<String> {
        GitCommand::current_commit()
            .current_dir(&self.path)
            .with_timeout(Some(self.timeout))
            .execute_stdout()
            .await
    }
}

/// Whether the `git` binary is available on this system.
#[must_use]
pub fn is_git_installed() -> bool {
    command_exists(get_git_command())
}

/// Fails with [`QuillError::GitNotFound`] when `git` is not installed.
pub fn ensure_git_available() -> Result<()> {
    if !is_git_installed() {
        return Err(QuillError::GitNotFound.into());
    }
    Ok(())
}
