//! sheaf - Groups pending changes into conventional commits and checks
//! inbound history for conflicts before a pull.
//!
//! # Overview
//!
//! Two independent pipelines share one injected [`GitProvider`]:
//!
//! - pending changes → [`changes`] → [`grouping`] → [`message`] → [`batch`]
//! - fetch → dual name-status diff → [`inbound`] conflict report
//!
//! Nothing is cached between calls; every operation builds its state fresh.

pub mod batch;
pub mod changes;
pub mod config;
pub mod error;
pub mod grouping;
pub mod inbound;
pub mod message;
pub mod provider;

// Re-export commonly used types
pub use batch::{BatchCommitter, CommitInfo};
pub use changes::{FileChange, FileStatus, extract_changes};
pub use config::EngineConfig;
pub use error::{BatchError, InboundError, ProviderError};
pub use grouping::{ChangeGroup, group_changes};
pub use inbound::{ChangesSummary, ConflictFile, InboundAnalyzer, InboundChanges, Severity};
pub use message::{CommitType, SuggestedMessage, suggest};
pub use provider::{GitCliProvider, GitProvider, RawChange, RepoStatus};
