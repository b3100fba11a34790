//! Error types for sheaf modules using thiserror.
//!
//! Every error exposes a stable, upper-snake `code()` so callers can branch
//! on the kind without matching display strings.

use thiserror::Error;

/// Errors reported by a [`GitProvider`](crate::provider::GitProvider).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("git executable not found in PATH")]
    NotInstalled,

    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error("Repository error: {0}")]
    Repository(#[source] git2::Error),

    #[error("git fetch timed out after {0} seconds")]
    Timeout(u64),

    #[error("git returned unexpected output: {0}")]
    InvalidOutput(String),

    /// Carries the last attempt's error; displays as that error.
    #[error(transparent)]
    FetchRetriesExhausted(Box<ProviderError>),

    /// A provider that reports its own domain code (e.g. a remote service
    /// or a test double) rather than a git process failure.
    #[error("{message}")]
    Rejected { code: String, message: String },
}

impl ProviderError {
    pub fn code(&self) -> &str {
        match self {
            ProviderError::NotInstalled => "GIT_NOT_INSTALLED",
            ProviderError::SpawnFailed(_) => "GIT_SPAWN_FAILED",
            ProviderError::CommandFailed { .. } => "GIT_COMMAND_FAILED",
            ProviderError::Repository(_) => "GIT_REPOSITORY_ERROR",
            ProviderError::Timeout(_) => "GIT_TIMEOUT",
            ProviderError::InvalidOutput(_) => "GIT_INVALID_OUTPUT",
            ProviderError::FetchRetriesExhausted(inner) => inner.code(),
            ProviderError::Rejected { code, .. } => code,
        }
    }

    /// Failures worth another attempt: the process could not start or ran
    /// out of time. Everything git itself rejects is permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Timeout(_) | ProviderError::SpawnFailed(_))
    }

    /// Shorthand for building a [`ProviderError::Rejected`].
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Errors from planning or executing a batch of commits.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("No changes to commit (working tree is clean)")]
    NoChanges,

    /// The provider could not enumerate changes; the provider error is
    /// surfaced as-is.
    #[error(transparent)]
    GetChangesFailed(ProviderError),

    #[error("Failed to stage group {group_id}: {source}")]
    StageFailed {
        group_id: String,
        #[source]
        source: ProviderError,
    },

    #[error("Failed to commit group {group_id}: {source}")]
    CommitFailed {
        group_id: String,
        #[source]
        source: ProviderError,
    },

    #[error("Batch commit aborted in {context}: {message}")]
    Unexpected { context: String, message: String },
}

impl BatchError {
    pub fn code(&self) -> &'static str {
        match self {
            BatchError::NoChanges => "NO_CHANGES",
            BatchError::GetChangesFailed(_) => "GET_CHANGES_FAILED",
            BatchError::StageFailed { .. } => "STAGE_FAILED",
            BatchError::CommitFailed { .. } => "COMMIT_FAILED",
            BatchError::Unexpected { .. } => "BATCH_COMMIT_ERROR",
        }
    }

    /// The group that failed, for stage/commit failures.
    pub fn group_id(&self) -> Option<&str> {
        match self {
            BatchError::StageFailed { group_id, .. } | BatchError::CommitFailed { group_id, .. } => {
                Some(group_id)
            }
            _ => None,
        }
    }
}

/// Errors from inbound change analysis.
#[derive(Error, Debug)]
pub enum InboundError {
    #[error("Inbound analysis failed in {context}: {message}")]
    Analysis { context: String, message: String },

    /// Provider failures are forwarded with their original code and message.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl InboundError {
    pub fn code(&self) -> &str {
        match self {
            InboundError::Analysis { .. } => "INBOUND_ANALYSIS_ERROR",
            InboundError::Provider(e) => e.code(),
        }
    }
}

/// Code logged when a diff line cannot be parsed. Never returned as an error.
pub const INBOUND_DIFF_PARSE_ERROR: &str = "INBOUND_DIFF_PARSE_ERROR";

/// Code logged when conflict classification degrades to partial results.
pub const CONFLICT_DETECTION_ERROR: &str = "CONFLICT_DETECTION_ERROR";
