//! Parser for `git diff --name-status` output.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::error::INBOUND_DIFF_PARSE_ERROR;

/// Status letter from a name-status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiffStatus {
    #[serde(rename = "A")]
    Added,
    #[serde(rename = "M")]
    Modified,
    #[serde(rename = "D")]
    Deleted,
    #[serde(rename = "R")]
    Renamed,
    #[serde(rename = "C")]
    Copied,
    #[serde(rename = "T")]
    TypeChanged,
    #[serde(rename = "X")]
    Unknown,
}

impl DiffStatus {
    /// Map a status token such as `M` or `R100` to its status.
    pub fn from_code(code: &str) -> Self {
        match code.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('A') => DiffStatus::Added,
            Some('M') => DiffStatus::Modified,
            Some('D') => DiffStatus::Deleted,
            Some('R') => DiffStatus::Renamed,
            Some('C') => DiffStatus::Copied,
            Some('T') => DiffStatus::TypeChanged,
            _ => DiffStatus::Unknown,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            DiffStatus::Added => "A",
            DiffStatus::Modified => "M",
            DiffStatus::Deleted => "D",
            DiffStatus::Renamed => "R",
            DiffStatus::Copied => "C",
            DiffStatus::TypeChanged => "T",
            DiffStatus::Unknown => "X",
        }
    }
}

/// Parse name-status text into a path → status map.
///
/// Each non-blank line is `<status> <path>`. Tab-separated lines (git's own
/// format) keep spaces inside paths; other lines are split on whitespace and
/// the path tokens rejoined with single spaces. Renames and copies map to
/// their destination path. Malformed lines are logged and skipped.
pub fn parse_name_status(text: &str) -> BTreeMap<String, DiffStatus> {
    let mut entries = BTreeMap::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line) {
            Some((status, path)) => {
                entries.insert(path, status);
            }
            None => warn!(
                context = "InboundAnalyzer",
                code = INBOUND_DIFF_PARSE_ERROR,
                line = line_no + 1,
                content = line,
                "skipping malformed diff line"
            ),
        }
    }

    entries
}

fn parse_line(line: &str) -> Option<(DiffStatus, String)> {
    let tokens: Vec<&str> = if line.contains('\t') {
        line.split('\t').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    };

    let (code, rest) = tokens.split_first()?;
    if code.is_empty() || rest.is_empty() {
        return None;
    }

    let status = DiffStatus::from_code(code);
    let path = match status {
        DiffStatus::Renamed | DiffStatus::Copied if line.contains('\t') && rest.len() >= 2 => {
            rest[rest.len() - 1].to_string()
        }
        _ => rest.join(" "),
    };

    if path.trim().is_empty() {
        return None;
    }
    Some((status, path))
}
