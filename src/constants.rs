//! Global constants used throughout the quill-contract codebase.
//!
//! Grammar defaults, cache layout names and timeout durations live here so
//! every module agrees on them and magic values stay discoverable.

use std::time::Duration;

/// Ref checked out when a repository location carries no `#fragment`.
pub const DEFAULT_GIT_REF: &str = "master";

/// Port assumed for `git://` and `git+ssh://` locations.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Port assumed for `git+https://` locations.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// User assumed when building an ssh clone URL and the location names none.
pub const DEFAULT_GIT_USER: &str = "git";

/// Cache subtree holding Git checkouts (`<root>/git/<host>/<repo-path>`).
pub const CACHE_GIT_SUBDIR: &str = "git";

/// Cache subtree holding downloaded web files (`<root>/web/<host>/<url-path>`).
pub const CACHE_WEB_SUBDIR: &str = "web";

/// Directory under the cache root where advisory lock files are kept.
pub const CACHE_LOCKS_SUBDIR: &str = ".locks";

/// Environment variable overriding the tool home directory.
pub const ENV_CONTRACT_HOME: &str = "QUILL_CONTRACT_HOME";

/// Environment variable overriding the cache root directory.
pub const ENV_CACHE_DIR: &str = "QUILL_CACHE_DIR";

/// Tool home under the user's home directory when no override is set.
pub const DEFAULT_HOME_RELATIVE: &str = ".quill/contract";

/// Default timeout for external process invocations (git) and downloads.
///
/// Clone, fetch, checkout and HTTP GET are the only operations in this
/// crate that can hang indefinitely; they are all bounded by this unless
/// the caller supplies a different value.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Age after which an abandoned cache lock file may be swept.
pub const STALE_LOCK_TTL_SECS: u64 = 3600;
