//! Human-readable summary of an inbound analysis.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::changes::file_type;

use super::conflicts::{ConflictFile, Severity};
use super::parse::DiffStatus;

/// Description used when the remote has nothing new.
pub const UP_TO_DATE_DESCRIPTION: &str = "Remote branch is up-to-date";

/// Recommendation used when no conflicts were found.
pub const NO_CONFLICTS_RECOMMENDATION: &str = "No conflicts detected; safe to pull";

/// Key used in `file_types` for files without an extension.
pub const NO_EXTENSION: &str = "(none)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangesSummary {
    pub description: String,
    pub total_inbound: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Inbound file count per extension.
    pub file_types: BTreeMap<String, usize>,
    pub recommendations: Vec<String>,
}

impl ChangesSummary {
    pub fn up_to_date() -> Self {
        Self {
            description: UP_TO_DATE_DESCRIPTION.to_string(),
            total_inbound: 0,
            high: 0,
            medium: 0,
            low: 0,
            file_types: BTreeMap::new(),
            recommendations: vec![NO_CONFLICTS_RECOMMENDATION.to_string()],
        }
    }
}

pub fn summarize(inbound: &BTreeMap<String, DiffStatus>, conflicts: &[ConflictFile]) -> ChangesSummary {
    let count = |severity: Severity| conflicts.iter().filter(|c| c.severity == severity).count();
    let (high, medium, low) = (count(Severity::High), count(Severity::Medium), count(Severity::Low));

    let mut file_types = BTreeMap::new();
    for path in inbound.keys() {
        let ext = file_type(path);
        let key = if ext.is_empty() { NO_EXTENSION.to_string() } else { ext };
        *file_types.entry(key).or_insert(0) += 1;
    }

    let mut recommendations: Vec<String> = conflicts
        .iter()
        .filter(|c| c.severity == Severity::High)
        .map(|c| {
            format!(
                "{}: {} locally and changed on remote; resolve before pulling",
                c.path,
                local_verb(c.local_status)
            )
        })
        .collect();

    if medium > 0 {
        recommendations.push(format!(
            "{medium} file(s) added on both sides; compare contents before merging"
        ));
    }
    if conflicts.is_empty() {
        recommendations.push(NO_CONFLICTS_RECOMMENDATION.to_string());
    }

    ChangesSummary {
        description: format!(
            "{} inbound file(s), {} potential conflict(s)",
            inbound.len(),
            conflicts.len()
        ),
        total_inbound: inbound.len(),
        high,
        medium,
        low,
        file_types,
        recommendations,
    }
}

fn local_verb(status: DiffStatus) -> &'static str {
    match status {
        DiffStatus::Modified => "modified",
        DiffStatus::Deleted => "deleted",
        DiffStatus::Added => "added",
        _ => "changed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(path: &str, local: DiffStatus, severity: Severity) -> ConflictFile {
        ConflictFile {
            path: path.to_string(),
            local_status: local,
            remote_status: DiffStatus::Modified,
            severity,
            local_changes: 1,
            remote_changes: 1,
        }
    }

    #[test]
    fn test_summary_without_conflicts() {
        let inbound: BTreeMap<String, DiffStatus> = [
            ("src/a.rs".to_string(), DiffStatus::Modified),
            ("src/b.rs".to_string(), DiffStatus::Added),
            ("Makefile".to_string(), DiffStatus::Modified),
        ]
        .into_iter()
        .collect();

        let summary = summarize(&inbound, &[]);
        assert_eq!(summary.total_inbound, 3);
        assert_eq!(summary.file_types[".rs"], 2);
        assert_eq!(summary.file_types[NO_EXTENSION], 1);
        assert_eq!(summary.recommendations, vec![NO_CONFLICTS_RECOMMENDATION]);
        assert_eq!(summary.description, "3 inbound file(s), 0 potential conflict(s)");
    }

    #[test]
    fn test_summary_lists_high_individually_and_counts_medium() {
        let inbound: BTreeMap<String, DiffStatus> = [
            ("a.rs".to_string(), DiffStatus::Modified),
            ("b.rs".to_string(), DiffStatus::Modified),
            ("c.rs".to_string(), DiffStatus::Added),
            ("d.rs".to_string(), DiffStatus::Added),
        ]
        .into_iter()
        .collect();
        let conflicts = vec![
            conflict("a.rs", DiffStatus::Modified, Severity::High),
            conflict("b.rs", DiffStatus::Deleted, Severity::High),
            conflict("c.rs", DiffStatus::Added, Severity::Medium),
            conflict("d.rs", DiffStatus::Added, Severity::Medium),
        ];

        let summary = summarize(&inbound, &conflicts);
        assert_eq!((summary.high, summary.medium, summary.low), (2, 2, 0));
        assert_eq!(summary.recommendations.len(), 3);
        assert!(summary.recommendations[0].starts_with("a.rs: modified locally"));
        assert!(summary.recommendations[1].starts_with("b.rs: deleted locally"));
        assert!(summary.recommendations[2].starts_with("2 file(s) added on both sides"));
    }

    #[test]
    fn test_up_to_date_summary() {
        let summary = ChangesSummary::up_to_date();
        assert_eq!(summary.description, UP_TO_DATE_DESCRIPTION);
        assert_eq!(summary.total_inbound, 0);
        assert_eq!(summary.recommendations.len(), 1);
    }
}
