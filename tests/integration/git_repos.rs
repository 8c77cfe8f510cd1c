//! Integration tests for repository operations against local upstream
//! fixtures. Clones go by filesystem path, so no network is involved.

use anyhow::Result;
use std::fs;
use tempfile::TempDir;

use quill_contract::git::{GitRepo, ensure_git_available, is_git_installed};
use quill_contract::test_utils::{TestGit, UpstreamFixture, init_test_logging};

#[test]
fn test_git_is_available_on_test_hosts() {
    assert!(is_git_installed());
    assert!(ensure_git_available().is_ok());
}

/// Clone a fixture, pin a tag, then move back to the branch tip.
#[tokio::test]
async fn test_clone_then_switch_between_tag_and_branch() -> Result<()> {
    init_test_logging(None);
    let temp = TempDir::new()?;
    let upstream = UpstreamFixture::create(temp.path().join("upstream"))?;
    upstream.commit_file("terms.md", "first terms\n", "Initial terms")?;
    upstream.tag("v0.1.0")?;
    let tagged_commit = upstream.head()?;
    upstream.commit_file("terms.md", "second terms\n", "Revise terms")?;
    let tip_commit = upstream.head()?;

    let clone_path = temp.path().join("clone");
    let repo = GitRepo::clone(&upstream.path().display().to_string(), &clone_path).await?;
    assert!(repo.is_git_repo());
    assert_eq!(repo.path(), clone_path.as_path());

    repo.fetch_ref("v0.1.0").await?;
    repo.checkout_ref("v0.1.0").await?;
    assert_eq!(repo.current_commit().await?, tagged_commit);
    assert_eq!(
        fs::read_to_string(clone_path.join("terms.md"))?,
        "first terms\n"
    );

    repo.fetch_ref("master").await?;
    repo.checkout_ref("master").await?;
    assert_eq!(repo.current_commit().await?, tip_commit);
    assert_eq!(
        fs::read_to_string(clone_path.join("terms.md"))?,
        "second terms\n"
    );
    Ok(())
}

/// Branch listing reports every local branch and which one is active,
/// tracking the active branch across a switch.
#[tokio::test]
async fn test_list_branches_reports_active_branch() -> Result<()> {
    let temp = TempDir::new()?;
    let upstream = UpstreamFixture::create(temp.path().join("upstream"))?;
    upstream.commit_file("terms.md", "terms\n", "Initial terms")?;

    let clone_path = temp.path().join("clone");
    let repo = GitRepo::clone(&upstream.path().display().to_string(), &clone_path).await?;
    let git = TestGit::new(&clone_path);

    // create_branch leaves the new branch checked out
    git.create_branch("draft")?;
    let (branches, active) = repo.list_branches().await?;
    assert_eq!(active, "draft");
    assert!(branches.contains(&"draft".to_string()));
    assert!(branches.contains(&"master".to_string()));

    git.checkout("master")?;
    let (_, active) = repo.list_branches().await?;
    assert_eq!(active, "master");
    Ok(())
}

/// Operations on a directory that is not a repository fail rather than
/// falling through to the surrounding filesystem.
#[tokio::test]
async fn test_operations_outside_a_repository_fail() -> Result<()> {
    let temp = TempDir::new()?;
    let repo = GitRepo::new(temp.path());
    assert!(!repo.is_git_repo());
    assert!(repo.current_commit().await.is_err());
    Ok(())
}
