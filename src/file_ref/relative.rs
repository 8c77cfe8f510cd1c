//! Resolution of relative references against an already-absolute base.
//!
//! A contract descriptor fetched from a repository may point at its
//! neighbours with plain relative paths (`./params.json`,
//! `../shared/styles.css`). Those paths are meaningless on their own; they
//! resolve against the reference that contained them, in that reference's
//! own scheme:
//!
//! - against a local base they become local paths next to the base file,
//! - against a web base they join onto the base URL,
//! - against a Git base they move within the same repository checkout,
//!   never out of it.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::cache::ContentCache;
use crate::core::QuillError;
use crate::git::GitUrl;
use crate::location::LocationKind;

use super::{FileRef, absolutize};

impl FileRef {
    /// Resolves `relative` against this reference.
    ///
    /// `self` must be an absolute reference (typically the descriptor the
    /// relative location was read from) and `relative.location` must
    /// actually be relative, otherwise this fails with
    /// [`QuillError::NotRelative`]. The relative reference's own hash serves
    /// as the expected hash for the resolved content, under the same
    /// `check_hash` policy as [`FileRef::resolve`].
    pub async fn resolve_relative(
        &self,
        relative: &FileRef,
        check_hash: bool,
        cache: &ContentCache,
    ) -> Result<FileRef> {
        if !relative.is_relative() {
            return Err(QuillError::NotRelative {
                location: relative.location.clone(),
            }
            .into());
        }
        debug!(
            base = %self.location,
            relative = %relative.location,
            "Resolving relative file reference"
        );
        let resolved = match self.kind() {
            LocationKind::Local => resolve_relative_local(self, &relative.location).await?,
            LocationKind::Web => {
                let target = join_web_location(&self.location, &relative.location)?;
                FileRef::from_web(&target, cache).await?
            }
            LocationKind::Repository => {
                resolve_relative_repository(self, &relative.location, cache).await?
            }
        };
        resolved.verify_expected(Some(relative.hash.as_str()), check_hash)?;
        Ok(resolved)
    }
}

/// Resolves a relative path against the directory of a local base file.
async fn resolve_relative_local(base: &FileRef, relative: &str) -> Result<FileRef> {
    let base_path = if base.local_path().as_os_str().is_empty() {
        // deserialized references only carry the location string
        PathBuf::from(&base.location)
    } else {
        base.local_path().to_path_buf()
    };
    let base_dir = absolutize(&base_path)?
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));
    FileRef::local(base_dir.join(relative)).await
}

/// Joins a relative location onto a base web URL, RFC 3986 style.
fn join_web_location(base: &str, relative: &str) -> Result<Url, QuillError> {
    let base_url = Url::parse(base).map_err(|e| QuillError::LocationParse {
        location: base.to_string(),
        reason: e.to_string(),
    })?;
    base_url.join(relative).map_err(|e| QuillError::LocationParse {
        location: relative.to_string(),
        reason: e.to_string(),
    })
}

/// Resolves a relative path against a base file inside a Git repository.
///
/// The repository stays fixed; only the in-repository path moves. The
/// protocol, host, repository and ref of the base URL all carry over to the
/// resolved reference.
async fn resolve_relative_repository(
    base: &FileRef,
    relative: &str,
    cache: &ContentCache,
) -> Result<FileRef> {
    let base_url = GitUrl::parse(&base.location)?;
    // make sure the repository is present before walking within it
    cache.from_repository(&base_url).await?;
    let path = rebase_repository_path(&base_url.path, relative)?;
    let target = GitUrl { path, ..base_url };
    FileRef::from_repository(&target, cache).await
}

/// Rebases a relative path onto the in-repository path of a base file.
///
/// Only leading `.` and `..` segments are interpreted: `.` stays in the base
/// file's directory and `..` climbs one level. The first named segment and
/// everything after it are taken verbatim. Climbing past the repository
/// root is an error, since the result would name a file outside the
/// repository the base lives in.
fn rebase_repository_path(base_path: &str, relative: &str) -> Result<String, QuillError> {
    let base_segments: Vec<&str> = base_path.split('/').collect();
    let rel_segments: Vec<&str> = relative.split('/').collect();

    // position of the base file within the repository tree
    let mut position = base_segments.len() as isize - 1;
    let mut named_start = None;
    for (i, segment) in rel_segments.iter().enumerate() {
        match *segment {
            "." => {}
            ".." => position -= 1,
            _ => {
                named_start = Some(i);
                break;
            }
        }
    }
    if position < 0 {
        return Err(QuillError::PathEscapesRepository {
            relative: relative.to_string(),
        });
    }

    let mut segments = base_segments[..position as usize].to_vec();
    if let Some(start) = named_start {
        segments.extend_from_slice(&rel_segments[start..]);
    }
    Ok(segments.join("/"))
}
