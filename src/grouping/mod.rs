//! Greedy similarity clustering of pending changes.
//!
//! Groups are built in one pass over an ordered pool: the first remaining
//! change seeds a group and pulls in every later change whose score against
//! the seed is above [`SIMILARITY_THRESHOLD`]. Members are only compared to
//! the seed, never to each other, so the result depends on input order and
//! nothing else.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::changes::FileChange;
use crate::message::{SuggestedMessage, suggest};

/// A candidate joins a group only when its score is strictly above this.
pub const SIMILARITY_THRESHOLD: f64 = 0.4;

/// A cluster of changes to be committed together.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeGroup {
    pub id: String,
    /// Never empty. The first file is the seed.
    pub files: Vec<FileChange>,
    pub suggested_message: SuggestedMessage,
    /// Mean score of each member against the seed; 1.0 for a single file.
    pub similarity: f64,
}

impl ChangeGroup {
    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Paths a commit of this group must cover: every path plus the source
    /// of each rename.
    pub fn pathspecs(&self) -> Vec<String> {
        let mut specs = self.paths();
        specs.extend(self.files.iter().filter_map(|f| f.previous_path.clone()));
        specs
    }
}

/// Pairwise similarity in `[0, 1]`.
///
/// Averages three components: status (1.0 or 0.5), domain (1.0 or 0.0)
/// and file type (0.5 or 0.2).
pub fn similarity(a: &FileChange, b: &FileChange) -> f64 {
    let type_match = if a.status == b.status { 1.0 } else { 0.5 };
    let domain_match = if a.domain == b.domain { 1.0 } else { 0.0 };
    let file_type_match = if a.file_type == b.file_type { 0.5 } else { 0.2 };

    (type_match + domain_match + file_type_match) / 3.0
}

/// Partition `changes` into groups. Every input change lands in exactly one group.
pub fn group_changes(changes: &[FileChange]) -> Vec<ChangeGroup> {
    let mut pool: Vec<FileChange> = changes.to_vec();
    let mut groups = Vec::new();

    while !pool.is_empty() {
        let seed = pool.remove(0);

        let mut members = Vec::new();
        let mut scores = Vec::new();
        let mut remaining = Vec::with_capacity(pool.len());
        for candidate in pool {
            let score = similarity(&seed, &candidate);
            if score > SIMILARITY_THRESHOLD {
                scores.push(score);
                members.push(candidate);
            } else {
                remaining.push(candidate);
            }
        }
        pool = remaining;

        let group_similarity = if scores.is_empty() {
            1.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        let mut files = Vec::with_capacity(members.len() + 1);
        files.push(seed);
        files.extend(members);

        let suggested_message = suggest(&files);
        debug!(
            context = "ChangeGrouper",
            files = files.len(),
            similarity = group_similarity,
            message = %suggested_message.full,
            "formed group"
        );

        groups.push(ChangeGroup {
            id: Uuid::new_v4().to_string(),
            files,
            suggested_message,
            similarity: group_similarity,
        });
    }

    groups
}
