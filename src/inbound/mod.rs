//! Inbound analysis: what a pull from the remote would bring in, and where
//! it collides with local staged work.
//!
//! The only side effect is the initial fetch. Everything after it reads
//! diffs and builds a fresh report.

pub mod conflicts;
pub mod link;
pub mod parse;
pub mod summary;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::InboundError;
use crate::provider::GitProvider;

pub use conflicts::{ConflictFile, Severity, detect_conflicts, estimate_changes};
pub use link::{ComparisonLink, HostingProvider, comparison_link, is_valid_branch};
pub use parse::{DiffStatus, parse_name_status};
pub use summary::{ChangesSummary, UP_TO_DATE_DESCRIPTION, summarize};

/// Local side of the comparison.
pub const LOCAL_REF: &str = "HEAD";

/// A file on the remote branch that is not in local history yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundFile {
    pub path: String,
    pub status: DiffStatus,
}

/// Report produced by one [`InboundAnalyzer::analyze`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundChanges {
    pub remote: String,
    pub branch: String,
    pub total_inbound: usize,
    pub files: Vec<InboundFile>,
    pub conflicts: Vec<ConflictFile>,
    pub summary: ChangesSummary,
    pub comparison: ComparisonLink,
}

pub struct InboundAnalyzer<'a, P: GitProvider + ?Sized> {
    provider: &'a P,
    remote: String,
}

impl<'a, P: GitProvider + ?Sized> InboundAnalyzer<'a, P> {
    pub fn new(provider: &'a P, remote: impl Into<String>) -> Self {
        Self {
            provider,
            remote: remote.into(),
        }
    }

    /// Fetch, diff `HEAD..<remote>/<branch>` against the staged diff, and
    /// classify the overlap.
    ///
    /// Provider failures are returned unchanged. An unusable branch name is an
    /// `INBOUND_ANALYSIS_ERROR`. A missing remote URL only degrades the link.
    pub async fn analyze(&self) -> Result<InboundChanges, InboundError> {
        self.provider.fetch(&self.remote).await?;

        let raw_branch = self.provider.get_current_branch().await?;
        let branch = raw_branch.trim();
        if !is_valid_branch(branch) {
            return Err(InboundError::Analysis {
                context: "resolve current branch".to_string(),
                message: format!("cannot compare against remote from branch '{branch}'"),
            });
        }

        let remote_ref = format!("{}/{}", self.remote, branch);
        let inbound_text = self
            .provider
            .diff(&format!("{LOCAL_REF}..{remote_ref}"))
            .await?;

        let comparison = self.comparison(branch).await;

        if inbound_text.trim().is_empty() {
            info!(context = "InboundAnalyzer", %remote_ref, "remote branch is up-to-date");
            return Ok(InboundChanges {
                remote: self.remote.clone(),
                branch: branch.to_string(),
                total_inbound: 0,
                files: Vec::new(),
                conflicts: Vec::new(),
                summary: ChangesSummary::up_to_date(),
                comparison,
            });
        }

        let local_text = self.provider.get_diff().await?;

        let remote_map = parse_name_status(&inbound_text);
        let local_map = parse_name_status(&local_text);
        let conflicts = detect_conflicts(&local_map, &remote_map, LOCAL_REF, &remote_ref);
        let summary = summarize(&remote_map, &conflicts);

        info!(
            context = "InboundAnalyzer",
            %remote_ref,
            inbound = remote_map.len(),
            conflicts = conflicts.len(),
            "inbound analysis complete"
        );

        let files = remote_map
            .iter()
            .map(|(path, &status)| InboundFile {
                path: path.clone(),
                status,
            })
            .collect();

        Ok(InboundChanges {
            remote: self.remote.clone(),
            branch: branch.to_string(),
            total_inbound: remote_map.len(),
            files,
            conflicts,
            summary,
            comparison,
        })
    }

    async fn comparison(&self, branch: &str) -> ComparisonLink {
        let url = match self.provider.get_remote_url(&self.remote).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(
                    context = "InboundAnalyzer",
                    remote = %self.remote,
                    code = e.code(),
                    "could not read remote URL: {e}"
                );
                None
            }
        };
        comparison_link(url.as_deref(), &self.remote, branch)
    }
}
