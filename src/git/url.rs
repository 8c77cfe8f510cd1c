//! Git pseudo-URL parsing.
//!
//! Contract locations inside Git repositories use a pseudo-URL format that
//! standard URL parsing cannot handle, so this module carries its own
//! grammar. Two forms exist:
//!
//! - `git+https://<host>/<path>[#fragment]`: standard URL syntax, parsed
//!   with the [`url`] crate; protocol forced to https, port forced to 443.
//! - `git://` or `git+ssh://`: a fixed custom grammar
//!   `proto://[user@]host[:/]path[#fragment]`; protocol forced to ssh, port
//!   forced to 22. The host separator may be `:` or `/`.
//!
//! The URL path is split into the repository path (the clone target, e.g.
//! `company/repo.git`) and the in-repo path (the file inside the checkout).
//! The boundary is heuristic: segments accumulate into the repository path
//! until one ends in `.git`, or until two segments have accumulated on
//! github.com. Self-hosted servers with arbitrary nesting can defeat the
//! heuristic, so callers may supply the boundary explicitly via
//! [`GitUrl::parse_with_repo_hint`].

use regex::Regex;
use std::fmt;
use url::Url;

use crate::constants::{DEFAULT_GIT_REF, DEFAULT_GIT_USER, DEFAULT_HTTPS_PORT, DEFAULT_SSH_PORT};
use crate::core::QuillError;

/// Custom grammar for `git://` and `git+ssh://` locations.
///
/// Path segments allow alphanumerics, space, `.`, `/` and `-`; fragments
/// allow alphanumerics, `.`, `-` and `/` (so branch names with slashes
/// survive). Bytes after a valid fragment are tolerated and ignored.
const GIT_URL_PATTERN: &str = r"^(?P<proto>[a-z+]+)://((?P<user>[a-zA-Z0-9._-]+)@)?(?P<host>[a-z0-9.-]+)[:/](?P<path>[a-zA-Z0-9 ./-]+)(#(?P<fragment>[a-zA-Z0-9/.-]+))?";

/// Host on which two path segments always form the repository path.
const TWO_SEGMENT_HOST: &str = "github.com";

/// Protocol by which a repository is accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitProtocol {
    /// `git://` and `git+ssh://` locations, cloned over ssh (port 22).
    Ssh,
    /// `git+https://` locations, cloned over https (port 443).
    Https,
}

impl fmt::Display for GitProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssh => write!(f, "ssh"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// Parsed form of a Git pseudo-URL.
///
/// `repo_path` and `path` partition the URL path with no overlap:
/// `repo_path` identifies the repository (the unit that gets cloned) and
/// `path` the file or folder within the checkout. `reference` is the
/// branch, tag or commit named by the `#fragment`, if any.
///
/// [`Display`](fmt::Display) renders the full address (in-repo path and ref
/// included) and is a left-inverse of parsing: for every value this parser
/// produces, parsing the rendered string yields the same value back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUrl {
    /// Protocol by which we want to access the repository.
    pub proto: GitProtocol,
    /// Optional user ahead of the host (e.g. `git` in `git@github.com`).
    pub user: Option<String>,
    /// The host name (e.g. `github.com` or `gitlab.com`).
    pub host: String,
    /// The port: 22 for ssh, 443 for https.
    pub port: u16,
    /// The repository path (e.g. `company/repo.git`).
    pub repo_path: String,
    /// The file/folder path within the repository. May be empty.
    pub path: String,
    /// The branch, commit or tag named by the fragment, if any.
    pub reference: Option<String>,
}

impl GitUrl {
    /// Parses a raw Git pseudo-URL, splitting the repository boundary with
    /// the built-in heuristic.
    pub fn parse(raw: &str) -> Result<Self, QuillError> {
        Self::parse_with_repo_hint(raw, None)
    }

    /// Parses a raw Git pseudo-URL with an explicit repository boundary.
    ///
    /// `repo_segments` is the number of leading path segments that form the
    /// repository path; everything after becomes the in-repo path. `None`
    /// falls back to the heuristic (`.git` suffix, or two segments on
    /// github.com). A hint larger than the segment count takes the whole
    /// path as the repository.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quill_contract::git::GitUrl;
    ///
    /// let u = GitUrl::parse_with_repo_hint(
    ///     "git://code.example.com/team/project/docs/terms.md",
    ///     Some(2),
    /// )?;
    /// assert_eq!(u.repo_path, "team/project");
    /// assert_eq!(u.path, "docs/terms.md");
    /// # Ok::<(), quill_contract::core::QuillError>(())
    /// ```
    pub fn parse_with_repo_hint(
        raw: &str,
        repo_segments: Option<usize>,
    ) -> Result<Self, QuillError> {
        if raw.starts_with("git+https://") {
            return Self::parse_https(raw, repo_segments);
        }
        Self::parse_custom(raw, repo_segments)
    }

    fn parse_https(raw: &str, repo_segments: Option<usize>) -> Result<Self, QuillError> {
        let url = Url::parse(raw).map_err(|e| QuillError::LocationParse {
            location: raw.to_string(),
            reason: e.to_string(),
        })?;
        let host = url
            .host_str()
            .ok_or_else(|| QuillError::LocationParse {
                location: raw.to_string(),
                reason: "missing host".to_string(),
            })?
            .to_string();
        let user = if url.username().is_empty() {
            None
        } else {
            Some(url.username().to_string())
        };
        let (repo_path, path) = split_repo_path(&host, url.path(), repo_segments);
        Ok(Self {
            proto: GitProtocol::Https,
            user,
            host,
            port: DEFAULT_HTTPS_PORT,
            repo_path,
            path,
            reference: url.fragment().map(str::to_string),
        })
    }

    fn parse_custom(raw: &str, repo_segments: Option<usize>) -> Result<Self, QuillError> {
        let re = Regex::new(GIT_URL_PATTERN).map_err(|e| QuillError::Other {
            message: format!("invalid Git URL pattern: {e}"),
        })?;
        let caps = re.captures(raw).ok_or_else(|| QuillError::LocationParse {
            location: raw.to_string(),
            reason: "not a recognizable Git repository URL".to_string(),
        })?;
        let proto = caps.name("proto").map_or("", |m| m.as_str());
        if proto != "git" && proto != "git+ssh" {
            return Err(QuillError::LocationParse {
                location: raw.to_string(),
                reason: format!("unrecognized protocol '{proto}'"),
            });
        }
        let host = caps.name("host").map_or("", |m| m.as_str()).to_string();
        let raw_path = caps.name("path").map_or("", |m| m.as_str());
        let (repo_path, path) = split_repo_path(&host, raw_path, repo_segments);
        Ok(Self {
            proto: GitProtocol::Ssh,
            user: caps.name("user").map(|m| m.as_str().to_string()),
            host,
            port: DEFAULT_SSH_PORT,
            repo_path,
            path,
            reference: caps.name("fragment").map(|m| m.as_str().to_string()),
        })
    }

    /// Renders the canonical clone URL: scheme, host (plus port when not the
    /// scheme default), and repository path. No in-repo path, no ref. This
    /// is the form the cache keys checkouts by.
    pub fn repo_url(&self) -> String {
        let user = self.user.as_deref().map(|u| format!("{u}@")).unwrap_or_default();
        match self.proto {
            GitProtocol::Ssh => format!("git://{user}{}:{}", self.host, self.repo_path),
            GitProtocol::Https => {
                let port = if self.port == DEFAULT_HTTPS_PORT {
                    String::new()
                } else {
                    format!(":{}", self.port)
                };
                format!("https://{user}{}{port}/{}", self.host, self.repo_path)
            }
        }
    }

    /// Renders the URL actually handed to `git clone`.
    ///
    /// Ssh repositories clone through scp-like syntax (`git@host:repo`),
    /// with the user defaulting to `git` when the location names none.
    /// Https repositories clone through the canonical URL as-is.
    pub fn clone_url(&self) -> String {
        match self.proto {
            GitProtocol::Ssh => format!(
                "{}@{}:{}",
                self.user.as_deref().unwrap_or(DEFAULT_GIT_USER),
                self.host,
                self.repo_path
            ),
            GitProtocol::Https => self.repo_url(),
        }
    }

    /// The ref to fetch and checkout: the parsed fragment, or the default
    /// branch name when the location named none.
    pub fn reference_or_default(&self) -> &str {
        self.reference
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_GIT_REF)
    }
}

impl fmt::Display for GitUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // https addresses render with the git+ prefix so the result still
        // classifies (and re-parses) as a repository location.
        match self.proto {
            GitProtocol::Ssh => write!(f, "{}", self.repo_url())?,
            GitProtocol::Https => write!(f, "git+{}", self.repo_url())?,
        }
        if !self.path.is_empty() {
            write!(f, "/{}", self.path)?;
        }
        if let Some(reference) = &self.reference {
            write!(f, "#{reference}")?;
        }
        Ok(())
    }
}

/// Splits a URL path into (repository path, in-repo path).
///
/// With a hint, the boundary sits after exactly `hint` segments. Without
/// one, segments accumulate into the repository path until a segment ends
/// in `.git` or the host is github.com and two segments have accumulated;
/// if neither rule fires, the whole path is the repository.
fn split_repo_path(host: &str, path: &str, hint: Option<usize>) -> (String, String) {
    let trimmed = path.trim_start_matches('/');
    if let Some(n) = hint {
        let parts: Vec<&str> = trimmed.split('/').collect();
        let n = n.min(parts.len());
        return (parts[..n].join("/"), parts[n..].join("/"));
    }
    let mut repo_parts: Vec<&str> = Vec::new();
    let mut path_parts: Vec<&str> = Vec::new();
    let mut parsing_repo = true;
    for part in trimmed.split('/') {
        if parsing_repo {
            repo_parts.push(part);
            if part.ends_with(".git") || (host == TWO_SEGMENT_HOST && repo_parts.len() == 2) {
                parsing_repo = false;
            }
        } else {
            path_parts.push(part);
        }
    }
    (repo_parts.join("/"), path_parts.join("/"))
}
