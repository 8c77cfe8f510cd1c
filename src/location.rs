//! Location strings and their classification.
//!
//! Every file a contract references is named by a location string, which is
//! one of three kinds:
//!
//! - a local filesystem path (`/tmp/contract/params.json`),
//! - a web URL (`https://example.com/params.json`),
//! - a Git pseudo-URL (`git://github.com:company/repo.git/params.json#v1`).
//!
//! Classification looks only at the string prefix and is total: `http://`
//! and `https://` mean web, a literal `git` prefix means repository, and
//! anything else is taken to be a local path. Nothing is validated at
//! classification time; a local path that does not exist fails later at
//! filesystem access, and a `git`-prefixed string that matches no repository
//! grammar fails at parse time.

use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::core::QuillError;
use crate::git::GitUrl;

/// The kind a location string classifies as. Purely prefix-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Local,
    Web,
    Repository,
}

impl LocationKind {
    /// Classifies a raw location string by prefix.
    pub fn of(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Web
        } else if raw.starts_with("git") {
            Self::Repository
        } else {
            Self::Local
        }
    }
}

/// A parsed location.
///
/// The three kinds are a closed set; matching on this enum is exhaustive,
/// so a hypothetical fourth scheme surfaces as a compile error at every
/// dispatch site rather than a silent fallthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A path on the local filesystem. Not required to exist.
    Local(PathBuf),
    /// An `http://` or `https://` URL.
    Web(Url),
    /// A Git pseudo-URL, see [`GitUrl`].
    Repository(GitUrl),
}

impl Location {
    /// Classifies and parses a raw location string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quill_contract::Location;
    ///
    /// let loc = Location::parse("git://github.com:company/repo.git#v0.1")?;
    /// assert!(matches!(loc, Location::Repository(_)));
    /// let loc = Location::parse("/tmp/contract.json")?;
    /// assert!(matches!(loc, Location::Local(_)));
    /// # Ok::<(), quill_contract::core::QuillError>(())
    /// ```
    pub fn parse(raw: &str) -> Result<Self, QuillError> {
        Self::parse_with_repo_hint(raw, None)
    }

    /// Like [`parse`](Self::parse), with an explicit repository boundary
    /// hint forwarded to [`GitUrl::parse_with_repo_hint`] for repository
    /// locations. The hint is ignored for the other kinds.
    pub fn parse_with_repo_hint(
        raw: &str,
        repo_segments: Option<usize>,
    ) -> Result<Self, QuillError> {
        match LocationKind::of(raw) {
            LocationKind::Local => Ok(Self::Local(PathBuf::from(raw))),
            LocationKind::Web => {
                let url = Url::parse(raw).map_err(|e| QuillError::LocationParse {
                    location: raw.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Self::Web(url))
            }
            LocationKind::Repository => {
                Ok(Self::Repository(GitUrl::parse_with_repo_hint(raw, repo_segments)?))
            }
        }
    }

    /// The kind of this location.
    pub fn kind(&self) -> LocationKind {
        match self {
            Self::Local(_) => LocationKind::Local,
            Self::Web(_) => LocationKind::Web,
            Self::Repository(_) => LocationKind::Repository,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Web(url) => write!(f, "{url}"),
            Self::Repository(git_url) => write!(f, "{git_url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_prefix() {
        assert_eq!(LocationKind::of("http://example.com/a.json"), LocationKind::Web);
        assert_eq!(LocationKind::of("https://example.com/a.json"), LocationKind::Web);
        assert_eq!(
            LocationKind::of("git://github.com:company/repo.git"),
            LocationKind::Repository
        );
        assert_eq!(
            LocationKind::of("git+ssh://github.com/company/repo.git"),
            LocationKind::Repository
        );
        assert_eq!(
            LocationKind::of("git+https://github.com/company/repo.git"),
            LocationKind::Repository
        );
        assert_eq!(LocationKind::of("/tmp/contract.json"), LocationKind::Local);
        assert_eq!(LocationKind::of("./relative/params.json"), LocationKind::Local);
        assert_eq!(LocationKind::of(""), LocationKind::Local);
    }

    #[test]
    fn test_classification_is_idempotent() {
        for raw in ["https://example.com/a", "git://h:r.git", "some/file.txt"] {
            assert_eq!(LocationKind::of(raw), LocationKind::of(raw));
        }
    }

    #[test]
    fn test_git_prefixed_local_name_is_classified_as_repository() {
        // the prefix rule is deliberately blunt: a local file whose name
        // starts with "git" classifies as a repository and fails to parse
        assert_eq!(LocationKind::of("gitignore-notes.txt"), LocationKind::Repository);
        let err = Location::parse("gitignore-notes.txt").unwrap_err();
        assert!(matches!(err, QuillError::LocationParse { .. }));
    }

    #[test]
    fn test_parse_dispatches_on_kind() {
        let loc = Location::parse("https://example.com/a/b.json").unwrap();
        assert!(matches!(loc, Location::Web(_)));
        assert_eq!(loc.kind(), LocationKind::Web);

        let loc = Location::parse("git://github.com:company/repo.git#v0.1").unwrap();
        match &loc {
            Location::Repository(git_url) => {
                assert_eq!(git_url.repo_path, "company/repo.git");
                assert_eq!(git_url.reference.as_deref(), Some("v0.1"));
            }
            other => panic!("expected repository, got {other:?}"),
        }

        let loc = Location::parse("/tmp/x/contract.json").unwrap();
        assert!(loc.is_local());
    }

    #[test]
    fn test_parse_rejects_malformed_web_url() {
        let err = Location::parse("http://[bad").unwrap_err();
        assert!(matches!(err, QuillError::LocationParse { .. }));
    }

    #[test]
    fn test_repo_hint_forwarded() {
        let loc = Location::parse_with_repo_hint(
            "git://code.example.com/team/project/docs/terms.md",
            Some(2),
        )
        .unwrap();
        match loc {
            Location::Repository(git_url) => {
                assert_eq!(git_url.repo_path, "team/project");
                assert_eq!(git_url.path, "docs/terms.md");
            }
            other => panic!("expected repository, got {other:?}"),
        }
    }

    #[test]
    fn test_display_round_trip() {
        for raw in [
            "/tmp/x/contract.json",
            "https://example.com/a/b.json",
            "git://github.com:company/repo.git/some/file.txt#v0.1",
        ] {
            let loc = Location::parse(raw).unwrap();
            assert_eq!(Location::parse(&loc.to_string()).unwrap(), loc);
        }
    }
}
