//! Test utilities.
//!
//! Helpers for writing tests against the resolution and caching code:
//! fixture Git repositories that stand in for remote upstreams, a
//! synchronous git wrapper for setting them up, and one-shot logging
//! initialization.
//!
//! Available to unit tests and, via the `test-utils` feature, to the
//! integration suite.

pub mod fixtures;
pub mod git_helper;

pub use fixtures::UpstreamFixture;
pub use git_helper::TestGit;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Initializes the tracing subscriber at most once regardless of how many
/// times it's called. Uses the provided level when given, otherwise respects
/// `RUST_LOG`, and stays silent when neither is set.
///
/// ```bash
/// RUST_LOG=git=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
