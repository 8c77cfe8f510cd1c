//! Test fixtures for building sample repositories and files.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use super::git_helper::TestGit;

/// A local Git repository standing in for a remote upstream.
///
/// Created on branch `master` so tests line up with the default ref used
/// when a location names none.
pub struct UpstreamFixture {
    path: PathBuf,
    git: TestGit,
}

impl UpstreamFixture {
    /// Creates the directory and initializes an empty repository on `master`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path)?;
        let git = TestGit::new(&path);
        git.init_with_branch("master")?;
        Ok(Self {
            path,
            git,
        })
    }

    /// The repository's path, which doubles as its clone URL in tests.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a file (creating parent directories) and commits it.
    pub fn commit_file(&self, rel_path: &str, content: &str, message: &str) -> Result<()> {
        let full = self.path.join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, content)?;
        self.git.add_all()?;
        self.git.commit(message)
    }

    /// Tags the current HEAD.
    pub fn tag(&self, tag_name: &str) -> Result<()> {
        self.git.tag(tag_name)
    }

    /// The commit hash at HEAD.
    pub fn head(&self) -> Result<String> {
        self.git.rev_parse_head()
    }

    /// The underlying git wrapper, for operations the fixture doesn't cover.
    pub fn git(&self) -> &TestGit {
        &self.git
    }
}
