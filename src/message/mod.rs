//! Rule-based conventional commit suggestions for a group of changes.

use std::fmt;

use serde::Serialize;

use crate::changes::{FileChange, FileStatus};

/// Extensions treated as documentation.
const DOC_EXTENSIONS: [&str; 3] = [".md", ".txt", ".rst"];

/// Conventional commit types the suggester can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Chore,
    Docs,
    Refactor,
}

impl CommitType {
    pub fn as_str(self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Chore => "chore",
            CommitType::Docs => "docs",
            CommitType::Refactor => "refactor",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A suggested conventional commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestedMessage {
    #[serde(rename = "type")]
    pub commit_type: CommitType,
    /// Empty when no scope applies.
    pub scope: String,
    pub description: String,
    /// `type(scope): description`, or `type: description` without a scope.
    pub full: String,
}

impl SuggestedMessage {
    pub fn new(commit_type: CommitType, scope: impl Into<String>, description: impl Into<String>) -> Self {
        let scope = scope.into();
        let description = description.into();
        let full = if scope.is_empty() {
            format!("{commit_type}: {description}")
        } else {
            format!("{commit_type}({scope}): {description}")
        };

        Self {
            commit_type,
            scope,
            description,
            full,
        }
    }
}

/// Suggest a commit message for the files of one group.
pub fn suggest(files: &[FileChange]) -> SuggestedMessage {
    let commit_type = classify(files);
    let scope = dominant_domain(files);
    let description = describe(files, &scope);
    SuggestedMessage::new(commit_type, scope, description)
}

/// Pick the commit type. Rules are checked in order and the first match wins.
fn classify(files: &[FileChange]) -> CommitType {
    let all_status = |status: FileStatus| files.iter().all(|f| f.status == status);

    if all_status(FileStatus::Added) {
        return CommitType::Feat;
    }
    if all_status(FileStatus::Modified) {
        return CommitType::Fix;
    }
    if files
        .iter()
        .all(|f| DOC_EXTENSIONS.contains(&f.file_type.as_str()))
    {
        return CommitType::Docs;
    }
    // Unreachable while the all-Modified rule above returns first. Kept so the
    // precedence stays explicit if that rule is ever narrowed.
    if all_status(FileStatus::Modified) && files.len() > 1 {
        return CommitType::Refactor;
    }
    CommitType::Chore
}

/// Most frequent domain; the first one seen wins ties.
fn dominant_domain(files: &[FileChange]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for file in files {
        match counts.iter_mut().find(|(d, _)| *d == file.domain) {
            Some((_, n)) => *n += 1,
            None => counts.push((file.domain.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (domain, n) in counts {
        if best.is_none_or(|(_, max)| n > max) {
            best = Some((domain, n));
        }
    }
    best.map(|(d, _)| d.to_string()).unwrap_or_default()
}

fn describe(files: &[FileChange], scope: &str) -> String {
    match files {
        [only] => format!("{} {}", only.status.verb(), only.basename()),
        [first, rest @ ..] if rest.iter().all(|f| f.status == first.status) => {
            format!("{} {} {} files", first.status.verb(), files.len(), scope)
        }
        _ => format!("update {} files", files.len()),
    }
}
