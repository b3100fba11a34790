//! Change extraction: annotate raw provider changes with a domain and file type.

use std::fmt;

use serde::Serialize;

use crate::provider::RawChange;

/// First path segment that marks the source root.
pub const SOURCE_ROOT_MARKER: &str = "src";

/// Second segment under the source root that holds per-domain directories.
pub const DOMAINS_MARKER: &str = "domains";

/// Second segment under the source root for infrastructure code.
pub const INFRASTRUCTURE_MARKER: &str = "infrastructure";

/// Domain used for paths without any segment.
pub const ROOT_DOMAIN: &str = "root";

/// Status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    /// Verb used in generated commit descriptions.
    pub fn verb(self) -> &'static str {
        match self {
            FileStatus::Added => "add",
            FileStatus::Modified => "update",
            FileStatus::Deleted => "remove",
            FileStatus::Renamed => "rename",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            FileStatus::Added => "Added",
            FileStatus::Modified => "Modified",
            FileStatus::Deleted => "Deleted",
            FileStatus::Renamed => "Renamed",
        })
    }
}

/// A pending change annotated with its logical domain and file type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    /// Source path of a rename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
    pub status: FileStatus,
    pub domain: String,
    /// Lowercase extension including the leading dot, or empty.
    pub file_type: String,
    pub additions: usize,
    pub deletions: usize,
}

impl FileChange {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        let path = path.into();
        Self {
            domain: derive_domain(&path),
            file_type: file_type(&path),
            path,
            previous_path: None,
            status,
            additions: 0,
            deletions: 0,
        }
    }

    /// Final path component.
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl From<&RawChange> for FileChange {
    fn from(raw: &RawChange) -> Self {
        Self {
            previous_path: raw.previous_path.clone(),
            additions: raw.additions,
            deletions: raw.deletions,
            ..FileChange::new(raw.path.clone(), raw.status)
        }
    }
}

/// Produce one [`FileChange`] per provider record, preserving order.
pub fn extract_changes(raw: &[RawChange]) -> Vec<FileChange> {
    raw.iter().map(FileChange::from).collect()
}

/// Derive the logical domain of a path.
///
/// `src/domains/<name>/...` yields `<name>`, `src/infrastructure/...` yields
/// `infrastructure`, anything else yields its first segment (or `root`).
pub fn derive_domain(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [root, marker, domain, ..] if *root == SOURCE_ROOT_MARKER && *marker == DOMAINS_MARKER => {
            domain.to_string()
        }
        [root, marker, ..] if *root == SOURCE_ROOT_MARKER && *marker == INFRASTRUCTURE_MARKER => {
            INFRASTRUCTURE_MARKER.to_string()
        }
        [first, ..] => first.to_string(),
        [] => ROOT_DOMAIN.to_string(),
    }
}

/// Lowercase extension of the file name including the dot, or empty.
pub fn file_type(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) => name[idx..].to_lowercase(),
        None => String::new(),
    }
}
