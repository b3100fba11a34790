//! Classification of paths changed on both sides of a prospective pull.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::parse::DiffStatus;
use crate::error::CONFLICT_DETECTION_ERROR;

/// Coarse risk ranking of a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// A path touched both locally and on the remote branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictFile {
    pub path: String,
    pub local_status: DiffStatus,
    pub remote_status: DiffStatus,
    pub severity: Severity,
    pub local_changes: u32,
    pub remote_changes: u32,
}

/// Compare local and remote maps and classify every shared path.
///
/// Only four status pairs produce a conflict:
///
/// | local | remote | severity |
/// |-------|--------|----------|
/// | M     | M      | high     |
/// | M     | D      | high     |
/// | D     | M      | high     |
/// | A     | A      | medium   |
///
/// Any other pair on a shared path is ignored.
pub fn detect_conflicts(
    local: &BTreeMap<String, DiffStatus>,
    remote: &BTreeMap<String, DiffStatus>,
    local_ref: &str,
    remote_ref: &str,
) -> Vec<ConflictFile> {
    info!(
        context = "InboundAnalyzer",
        local_count = local.len(),
        remote_count = remote.len(),
        "detecting conflicts"
    );

    let mut conflicts = Vec::new();

    for (path, &remote_status) in remote {
        let Some(&local_status) = local.get(path) else {
            continue;
        };

        let local_estimate = || estimate_changes(path, local_ref);
        let remote_estimate = || estimate_changes(path, remote_ref);

        let classified = match (local_status, remote_status) {
            (DiffStatus::Modified, DiffStatus::Modified) => {
                Some((Severity::High, local_estimate(), remote_estimate()))
            }
            (DiffStatus::Modified, DiffStatus::Deleted) => Some((Severity::High, local_estimate(), 0)),
            (DiffStatus::Deleted, DiffStatus::Modified) => Some((Severity::High, 0, remote_estimate())),
            (DiffStatus::Added, DiffStatus::Added) => {
                Some((Severity::Medium, local_estimate(), remote_estimate()))
            }
            _ => None,
        };

        match classified {
            Some((severity, local_changes, remote_changes)) => {
                debug!(
                    context = "InboundAnalyzer",
                    %path,
                    %severity,
                    "conflict detected"
                );
                conflicts.push(ConflictFile {
                    path: path.clone(),
                    local_status,
                    remote_status,
                    severity,
                    local_changes,
                    remote_changes,
                });
            }
            None if local_status == DiffStatus::Unknown || remote_status == DiffStatus::Unknown => {
                warn!(
                    context = "InboundAnalyzer",
                    code = CONFLICT_DETECTION_ERROR,
                    %path,
                    local = local_status.code(),
                    remote = remote_status.code(),
                    "unrecognised status on shared path; skipping"
                );
            }
            None => debug!(
                context = "InboundAnalyzer",
                %path,
                local = local_status.code(),
                remote = remote_status.code(),
                "shared path not classified as a conflict"
            ),
        }
    }

    conflicts
}

/// Deterministic stand-in for a change magnitude, in `1..=100`.
///
/// Hashes `path|reference`; it does not read real diff statistics.
pub fn estimate_changes(path: &str, reference: &str) -> u32 {
    let key = format!("{path}|{reference}");
    let hash = key
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
    hash % 100 + 1
}
