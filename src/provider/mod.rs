//! Version-control provider capability.
//!
//! The engine never touches repository storage directly. Everything it
//! needs is expressed by [`GitProvider`], which is injected into the
//! committer and the analyzer so tests can substitute their own.

pub mod cli;
pub mod retry;

use async_trait::async_trait;
use serde::Serialize;

use crate::changes::FileStatus;
use crate::error::ProviderError;

pub use cli::{GitCliProvider, check_git_installed};

/// Snapshot of the working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoStatus {
    pub branch: String,
    pub dirty: bool,
    pub staged: usize,
    pub unstaged: usize,
    pub untracked: usize,
}

/// A pending change as reported by the provider, before domain annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChange {
    pub path: String,
    /// Source path of a rename.
    pub previous_path: Option<String>,
    pub status: FileStatus,
    pub additions: usize,
    pub deletions: usize,
}

/// Operations the engine consumes from a version-control backend.
///
/// Implementations must tolerate strictly sequential use: the engine never
/// issues two calls concurrently against the same repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitProvider: Send + Sync {
    /// Branch name and staged/unstaged/untracked counts.
    async fn status(&self) -> Result<RepoStatus, ProviderError>;

    /// Staged and unstaged changes combined, one entry per path.
    async fn get_all_changes(&self) -> Result<Vec<RawChange>, ProviderError>;

    async fn stage(&self, paths: &[String]) -> Result<(), ProviderError>;

    /// Commit the staged state of `paths` only and return the new commit
    /// hash. Other staged entries stay staged.
    async fn commit(&self, message: &str, paths: &[String]) -> Result<String, ProviderError>;

    /// Move HEAD to `target`, keeping the index and working tree.
    ///
    /// `<root>^`, the parent of a root commit, returns the branch to its
    /// unborn state.
    async fn reset_soft(&self, target: &str) -> Result<(), ProviderError>;

    async fn fetch(&self, remote: &str) -> Result<(), ProviderError>;

    async fn get_remote_url(&self, remote: &str) -> Result<String, ProviderError>;

    async fn get_current_branch(&self) -> Result<String, ProviderError>;

    /// Name-status diff for a revision expression such as `HEAD..origin/main`.
    async fn diff(&self, revisions: &str) -> Result<String, ProviderError>;

    /// Name-status diff of the staged changes.
    async fn get_diff(&self) -> Result<String, ProviderError>;
}
