//! Fluent builder for Git subprocess invocations.
//!
//! All Git work in this crate goes through [`GitCommand`], which gives every
//! invocation the same treatment: a `-C` working-directory flag instead of
//! process-wide chdir, a bounded execution time, captured output, and failure
//! mapping onto the crate's error kinds.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::DEFAULT_OPERATION_TIMEOUT;
use crate::core::QuillError;
use crate::utils::platform::get_git_command;

/// Builder for constructing and executing Git commands.
///
/// # Examples
///
/// ```rust,no_run
/// use quill_contract::git::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let output = GitCommand::new()
///     .args(["status", "--porcelain"])
///     .current_dir("/path/to/checkout")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
pub struct GitCommand {
    /// Arguments passed to Git (e.g. `["fetch", "origin", "master"]`).
    args: Vec<String>,

    /// Working directory, passed via `-C` so the process cwd never changes.
    current_dir: Option<std::path::PathBuf>,

    /// Environment variables set for the Git process.
    env_vars: Vec<(String, String)>,

    /// Maximum duration to wait for completion (None = unbounded).
    timeout_duration: Option<Duration>,

    /// Context string included in log lines, typically the location being
    /// resolved, to tell concurrent operations apart.
    context: Option<String>,

    /// For clone commands, the URL kept aside for error reporting.
    clone_url: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            timeout_duration: Some(DEFAULT_OPERATION_TIMEOUT),
            context: None,
            clone_url: None,
        }
    }
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory the command runs in.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the Git process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Overrides the execution timeout (None disables the bound).
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Sets a context string included in log messages, so interleaved output
    /// from concurrent resolutions stays attributable.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Executes the command and returns its captured output.
    ///
    /// A non-zero exit maps to [`QuillError::GitCloneFailed`],
    /// [`QuillError::GitCheckoutFailed`] or [`QuillError::GitCommandError`]
    /// depending on the subcommand; exceeding the timeout maps to
    /// [`QuillError::CommandTimeout`].
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let git_command = get_git_command();
        let mut cmd = Command::new(git_command);

        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            // keep the path as written; canonicalizing resolves symlinks like
            // /var vs /private/var on macOS and breaks path comparisons
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.clone());

        cmd.args(&full_args);

        if let Some(ref ctx) = self.context {
            tracing::debug!(
                target: "git",
                "({}) Executing command: {} {}",
                ctx,
                git_command,
                full_args.join(" ")
            );
        } else {
            tracing::debug!(
                target: "git",
                "Executing command: {} {}",
                git_command,
                full_args.join(" ")
            );
        }

        for (key, value) in &self.env_vars {
            tracing::trace!(target: "git", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => {
                    result.context(format!("Failed to execute git {}", full_args.join(" ")))?
                }
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "Command timed out after {} seconds: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    );
                    return Err(QuillError::CommandTimeout {
                        operation: format!("git {}", operation_name(&full_args)),
                        seconds: duration.as_secs(),
                    }
                    .into());
                }
            }
        } else {
            output_future.await.context(format!("Failed to execute git {}", full_args.join(" ")))?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);

            tracing::debug!(
                target: "git",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "git", "Error: {}", stderr);
            }
            if !stdout.is_empty() && stderr.is_empty() {
                tracing::debug!(target: "git", "Error output: {}", stdout);
            }

            let operation = operation_name(&full_args);
            let error = match operation {
                "clone" => QuillError::GitCloneFailed {
                    url: self.clone_url.unwrap_or_else(|| "unknown".to_string()),
                    reason: stderr.to_string(),
                },
                "checkout" => QuillError::GitCheckoutFailed {
                    reference: effective_args(&full_args)
                        .get(1)
                        .cloned()
                        .unwrap_or_default(),
                    reason: stderr.to_string(),
                },
                _ => QuillError::GitCommandError {
                    operation: operation.to_string(),
                    stderr: if stderr.is_empty() {
                        stdout.to_string()
                    } else {
                        stderr.to_string()
                    },
                },
            };

            return Err(error.into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stdout.is_empty() {
            if let Some(ref ctx) = self.context {
                tracing::debug!(target: "git", "({}) {}", ctx, stdout.trim());
            } else {
                tracing::debug!(target: "git", "{}", stdout.trim());
            }
        }
        if !stderr.is_empty() {
            if let Some(ref ctx) = self.context {
                tracing::debug!(target: "git", "({}) {}", ctx, stderr.trim());
            } else {
                tracing::debug!(target: "git", "{}", stderr.trim());
            }
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            let operation = operation_name(&full_args);
            if let Some(ref ctx) = self.context {
                tracing::info!(target: "git::perf", "({}) Git {} took {:.2}s", ctx, operation, elapsed.as_secs_f64());
            } else {
                tracing::info!(target: "git::perf", "Git {} took {:.2}s", operation, elapsed.as_secs_f64());
            }
        } else if elapsed.as_millis() > 100 {
            let operation = operation_name(&full_args);
            if let Some(ref ctx) = self.context {
                tracing::debug!(target: "git::perf", "({}) Git {} took {}ms", ctx, operation, elapsed.as_millis());
            } else {
                tracing::debug!(target: "git::perf", "Git {} took {}ms", operation, elapsed.as_millis());
            }
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Executes the command and returns trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Executes the command, keeping only success or failure.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Arguments with any leading `-C <dir>` pair stripped.
fn effective_args(full_args: &[String]) -> &[String] {
    if full_args.first().map(String::as_str) == Some("-C") && full_args.len() > 2 {
        &full_args[2..]
    } else {
        full_args
    }
}

/// The Git subcommand name, ignoring the `-C <dir>` prefix.
fn operation_name(full_args: &[String]) -> &str {
    effective_args(full_args).first().map_or("unknown", String::as_str)
}

/// Output from a Git command.
pub struct GitCommandOutput {
    /// Standard output from the Git command.
    pub stdout: String,
    /// Standard error output from the Git command.
    pub stderr: String,
}

// Convenience builders for the operations the cache performs.

impl GitCommand {
    /// `git clone <url> <target>`.
    pub fn clone(url: &str, target: impl AsRef<Path>) -> Self {
        let mut cmd = Self::new();
        cmd.args.push("clone".to_string());
        cmd.args.push(url.to_string());
        cmd.args.push(target.as_ref().display().to_string());
        cmd.clone_url = Some(url.to_string());
        cmd
    }

    /// `git fetch origin <ref>`.
    pub fn fetch_ref(ref_name: &str) -> Self {
        Self::new().args(["fetch", "origin", ref_name])
    }

    /// `git checkout <ref>`.
    pub fn checkout(ref_name: &str) -> Self {
        Self::new().args(["checkout", ref_name])
    }

    /// `git pull origin <branch>`.
    pub fn pull(branch: &str) -> Self {
        Self::new().args(["pull", "origin", branch])
    }

    /// `git branch -l`, listing local branches with the active one starred.
    pub fn list_local_branches() -> Self {
        Self::new().args(["branch", "-l"])
    }

    /// `git rev-parse HEAD`.
    pub fn current_commit() -> Self {
        Self::new().args(["rev-parse", "HEAD"])
    }
}
