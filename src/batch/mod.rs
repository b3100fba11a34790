//! Batch committer: stage and commit approved groups in order, rolling the
//! whole batch back on the first failure.
//!
//! Rollback is a compensating `reset --soft` to the parent of the first
//! commit made in the batch, so every change the batch committed is left
//! staged. When that first commit was the root commit the branch goes back
//! to unborn. Each group's commit covers only its own paths, so changes the
//! user staged for later groups stay staged until their turn.
//!
//! Rollback is best-effort only: a crash mid-batch leaves the partial commits
//! in place.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::changes::extract_changes;
use crate::error::BatchError;
use crate::grouping::{ChangeGroup, group_changes};
use crate::provider::GitProvider;

/// A commit created by a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub files: Vec<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Plans and executes batches against an injected provider.
pub struct BatchCommitter<'a, P: GitProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: GitProvider + ?Sized> BatchCommitter<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Enumerate pending changes and group them with suggested messages.
    pub async fn plan(&self) -> Result<Vec<ChangeGroup>, BatchError> {
        let raw = self
            .provider
            .get_all_changes()
            .await
            .map_err(BatchError::GetChangesFailed)?;

        if raw.is_empty() {
            return Err(BatchError::NoChanges);
        }

        let changes = extract_changes(&raw);
        let groups = group_changes(&changes);
        info!(
            context = "BatchCommitter",
            changes = changes.len(),
            groups = groups.len(),
            "planned batch"
        );
        Ok(groups)
    }

    /// Commit each group in order.
    ///
    /// Calls are strictly sequential; staging or committing two groups at once
    /// against one index can corrupt it. On the first failure every commit made
    /// so far is rolled back and the original error is returned.
    pub async fn execute_batch(&self, groups: &[ChangeGroup]) -> Result<Vec<CommitInfo>, BatchError> {
        let mut commits = Vec::with_capacity(groups.len());

        match self.commit_groups(groups, &mut commits).await {
            Ok(()) => {
                info!(context = "BatchCommitter", commits = commits.len(), "batch committed");
                Ok(commits)
            }
            Err(e) => {
                warn!(
                    context = "BatchCommitter",
                    code = e.code(),
                    group = e.group_id().unwrap_or_default(),
                    "batch failed: {e}"
                );
                self.rollback(&commits).await;
                Err(e)
            }
        }
    }

    async fn commit_groups(
        &self,
        groups: &[ChangeGroup],
        commits: &mut Vec<CommitInfo>,
    ) -> Result<(), BatchError> {
        for group in groups {
            let paths = group.paths();
            if paths.is_empty() {
                return Err(BatchError::Unexpected {
                    context: format!("group {}", group.id),
                    message: "group has no files".to_string(),
                });
            }

            self.provider
                .stage(&paths)
                .await
                .map_err(|source| BatchError::StageFailed {
                    group_id: group.id.clone(),
                    source,
                })?;

            let message = &group.suggested_message.full;
            let hash = self
                .provider
                .commit(message, &group.pathspecs())
                .await
                .map_err(|source| BatchError::CommitFailed {
                    group_id: group.id.clone(),
                    source,
                })?;

            let hash = hash.trim().to_string();
            if hash.is_empty() {
                return Err(BatchError::Unexpected {
                    context: format!("group {}", group.id),
                    message: "provider returned an empty commit hash".to_string(),
                });
            }

            info!(context = "BatchCommitter", %hash, %message, files = paths.len(), "committed group");
            commits.push(CommitInfo {
                hash,
                message: message.clone(),
                files: paths,
                timestamp: Utc::now().timestamp_millis(),
            });
        }

        Ok(())
    }

    /// Undo every commit of the batch, keeping their changes staged.
    ///
    /// A no-op when nothing was committed. Failures are logged and never
    /// replace the error that triggered the rollback.
    async fn rollback(&self, commits: &[CommitInfo]) {
        let Some(first) = commits.first() else {
            return;
        };

        let target = format!("{}^", first.hash);
        match self.provider.reset_soft(&target).await {
            Ok(()) => warn!(
                context = "BatchCommitter",
                %target,
                undone = commits.len(),
                "rolled back batch"
            ),
            Err(e) => error!(
                context = "BatchCommitter",
                %target,
                code = e.code(),
                "rollback failed: {e}"
            ),
        }
    }
}
