//! Production provider backed by git2 reads and the system `git` binary.
//!
//! Read-only queries go through git2. Anything that mutates the repository
//! or touches the network shells out to `git`, inheriting the user's config,
//! hooks, SSH agent and credential store.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use git2::{Delta, Diff, DiffFindOptions, DiffOptions, ErrorCode, Patch, Repository, Status, StatusOptions, Tree};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::changes::FileStatus;
use crate::config::EngineConfig;
use crate::error::ProviderError;

use super::retry::retry_with_backoff;
use super::{GitProvider, RawChange, RepoStatus};

/// Check that the `git` executable is available.
pub fn check_git_installed() -> Result<(), ProviderError> {
    which::which("git").map(|_| ()).map_err(|_| ProviderError::NotInstalled)
}

/// [`GitProvider`] for a working tree on disk.
#[derive(Debug, Clone)]
pub struct GitCliProvider {
    workdir: PathBuf,
    fetch_timeout: Duration,
}

impl GitCliProvider {
    pub fn new(workdir: impl Into<PathBuf>, config: &EngineConfig) -> Self {
        Self {
            workdir: workdir.into(),
            fetch_timeout: config.fetch_timeout,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn open(&self) -> Result<Repository, ProviderError> {
        Repository::open(&self.workdir).map_err(ProviderError::Repository)
    }

    /// Run a git command in the working tree and return its stdout.
    async fn run_git(&self, args: &[&str], operation: &str) -> Result<String, ProviderError> {
        debug!(context = "GitCliProvider", operation, ?args, "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ProviderError::SpawnFailed)?;

        if !output.status.success() {
            // Some refusals ("nothing to commit") are printed on stdout only.
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(ProviderError::CommandFailed {
                operation: operation.to_string(),
                stderr: detail,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Whether `target` is `<rev>^` for a commit without parents.
    fn is_parent_of_root(&self, target: &str) -> Result<bool, ProviderError> {
        let Some(base) = target.strip_suffix('^') else {
            return Ok(false);
        };

        let repo = self.open()?;
        let Ok(object) = repo.revparse_single(base) else {
            return Ok(false);
        };
        let commit = object.peel_to_commit().map_err(ProviderError::Repository)?;
        Ok(commit.parent_count() == 0)
    }

    async fn fetch_once(&self, remote: &str) -> Result<(), ProviderError> {
        let secs = self.fetch_timeout.as_secs();
        timeout(self.fetch_timeout, self.run_git(&["fetch", remote], "fetch"))
            .await
            .map_err(|_| ProviderError::Timeout(secs))?
            .map(|_| ())
    }
}

#[async_trait]
impl GitProvider for GitCliProvider {
    async fn status(&self) -> Result<RepoStatus, ProviderError> {
        let repo = self.open()?;
        let branch = branch_name(&repo)?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(ProviderError::Repository)?;

        let staged_mask = Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE;
        let unstaged_mask = Status::WT_MODIFIED
            | Status::WT_DELETED
            | Status::WT_RENAMED
            | Status::WT_TYPECHANGE;

        let (mut staged, mut unstaged, mut untracked) = (0, 0, 0);
        for entry in statuses.iter() {
            let s = entry.status();
            if s.intersects(staged_mask) {
                staged += 1;
            }
            if s.intersects(unstaged_mask) {
                unstaged += 1;
            }
            if s.contains(Status::WT_NEW) {
                untracked += 1;
            }
        }

        Ok(RepoStatus {
            branch,
            dirty: staged + unstaged + untracked > 0,
            staged,
            unstaged,
            untracked,
        })
    }

    async fn get_all_changes(&self) -> Result<Vec<RawChange>, ProviderError> {
        let repo = self.open()?;
        let head_tree = resolve_head_tree(&repo)?;

        let mut staged = repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)
            .map_err(ProviderError::Repository)?;
        let mut find = DiffFindOptions::new();
        find.renames(true);
        staged
            .find_similar(Some(&mut find))
            .map_err(ProviderError::Repository)?;

        let mut opts = DiffOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .show_untracked_content(true);
        let unstaged = repo
            .diff_index_to_workdir(None, Some(&mut opts))
            .map_err(ProviderError::Repository)?;

        let mut changes = Vec::new();
        collect_changes(&staged, &mut changes);
        collect_changes(&unstaged, &mut changes);

        // Stable sort keeps the staged entry first for each path.
        changes.sort_by(|a, b| a.path.cmp(&b.path));
        changes.dedup_by(|a, b| a.path == b.path);

        Ok(changes)
    }

    async fn stage(&self, paths: &[String]) -> Result<(), ProviderError> {
        if paths.is_empty() {
            return Err(ProviderError::InvalidOutput("No paths to stage".into()));
        }

        let mut args = vec!["add", "--all", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_git(&args, "add").await.map(|_| ())
    }

    async fn commit(&self, message: &str, paths: &[String]) -> Result<String, ProviderError> {
        if paths.is_empty() {
            return Err(ProviderError::InvalidOutput("No paths to commit".into()));
        }

        let mut args = vec!["commit", "--quiet", "-m", message, "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_git(&args, "commit").await?;
        let hash = self.run_git(&["rev-parse", "HEAD"], "rev-parse").await?;
        Ok(hash.trim().to_string())
    }

    async fn reset_soft(&self, target: &str) -> Result<(), ProviderError> {
        if self.is_parent_of_root(target)? {
            // Deleting the branch ref leaves HEAD unborn and the index intact.
            debug!(context = "GitCliProvider", %target, "resetting to unborn branch");
            return self
                .run_git(&["update-ref", "-d", "HEAD"], "update-ref")
                .await
                .map(|_| ());
        }

        self.run_git(&["reset", "--soft", target], "reset")
            .await
            .map(|_| ())
    }

    async fn fetch(&self, remote: &str) -> Result<(), ProviderError> {
        retry_with_backoff(
            || self.fetch_once(remote),
            ProviderError::is_retryable,
            |e| ProviderError::FetchRetriesExhausted(Box::new(e)),
        )
        .await
    }

    async fn get_remote_url(&self, remote: &str) -> Result<String, ProviderError> {
        let repo = self.open()?;
        let found = repo.find_remote(remote).map_err(ProviderError::Repository)?;
        found
            .url()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::InvalidOutput(format!("Remote '{remote}' has no URL")))
    }

    async fn get_current_branch(&self) -> Result<String, ProviderError> {
        let repo = self.open()?;
        branch_name(&repo)
    }

    async fn diff(&self, revisions: &str) -> Result<String, ProviderError> {
        self.run_git(&["diff", "--name-status", revisions], "diff")
            .await
    }

    async fn get_diff(&self) -> Result<String, ProviderError> {
        self.run_git(&["diff", "--cached", "--name-status"], "diff --cached")
            .await
    }
}

/// Current branch name. Returns `"HEAD"` when detached.
fn branch_name(repo: &Repository) -> Result<String, ProviderError> {
    match repo.head() {
        Ok(head) => Ok(head.shorthand().unwrap_or_default().to_string()),
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            // No commits yet: HEAD is still a symbolic ref to the branch.
            let head = repo
                .find_reference("HEAD")
                .map_err(ProviderError::Repository)?;
            Ok(head
                .symbolic_target()
                .and_then(|t| t.strip_prefix("refs/heads/"))
                .unwrap_or_default()
                .to_string())
        }
        Err(e) => Err(ProviderError::Repository(e)),
    }
}

/// HEAD tree, or `None` for a repository without commits.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, ProviderError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(ProviderError::Repository(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(ProviderError::Repository)?;
    Ok(Some(tree))
}

fn collect_changes(diff: &Diff<'_>, changes: &mut Vec<RawChange>) {
    for (idx, delta) in diff.deltas().enumerate() {
        let status = match delta.status() {
            Delta::Added | Delta::Untracked => FileStatus::Added,
            Delta::Deleted => FileStatus::Deleted,
            Delta::Renamed => FileStatus::Renamed,
            _ => FileStatus::Modified,
        };

        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        if path.is_empty() {
            continue;
        }

        let (additions, deletions) = match Patch::from_diff(diff, idx) {
            Ok(Some(patch)) => patch
                .line_stats()
                .map(|(_, add, del)| (add, del))
                .unwrap_or((0, 0)),
            Ok(None) => (0, 0),
            Err(e) => {
                warn!(context = "GitCliProvider", %path, "Failed to read line stats: {e}");
                (0, 0)
            }
        };

        let previous_path = (status == FileStatus::Renamed)
            .then(|| delta.old_file().path())
            .flatten()
            .map(|p| p.to_string_lossy().to_string())
            .filter(|old| *old != path);

        changes.push(RawChange {
            path,
            previous_path,
            status,
            additions,
            deletions,
        });
    }
}
