//! Inbound analysis tests, against the in-memory provider and real
//! repositories sharing a local bare remote.

mod common;

use common::{FakeProvider, TestRepo, bare_remote};
use sheaf::inbound::{ComparisonLink, UP_TO_DATE_DESCRIPTION};
use sheaf::{EngineConfig, GitCliProvider, InboundAnalyzer, Severity};

#[tokio::test]
async fn test_up_to_date_skips_local_diff() {
    let provider = FakeProvider::with_diffs("", "M\tsrc/x.ts\n");
    let report = InboundAnalyzer::new(&provider, "origin")
        .analyze()
        .await
        .unwrap();

    assert_eq!(report.total_inbound, 0);
    assert!(report.conflicts.is_empty());
    assert_eq!(report.summary.description, UP_TO_DATE_DESCRIPTION);
    assert!(provider.calls_named("get_diff").is_empty());
    assert_eq!(provider.calls()[0], "fetch origin");
}

#[tokio::test]
async fn test_modified_on_both_sides_is_high() {
    let provider = FakeProvider::with_diffs("M\tsrc/x.ts\nA\tdocs/new.md\n", "M\tsrc/x.ts\n");
    let report = InboundAnalyzer::new(&provider, "origin")
        .analyze()
        .await
        .unwrap();

    assert_eq!(report.total_inbound, 2);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].path, "src/x.ts");
    assert_eq!(report.conflicts[0].severity, Severity::High);
    assert_eq!(report.summary.high, 1);
    assert!(
        report.summary.recommendations[0].starts_with("src/x.ts:"),
        "{:?}",
        report.summary.recommendations
    );
    assert_eq!(
        provider.calls_named("diff"),
        vec!["diff HEAD..origin/main".to_string()]
    );
}

#[tokio::test]
async fn test_added_on_both_sides_is_medium() {
    let provider = FakeProvider::with_diffs("A\tsrc/y.ts\n", "A\tsrc/y.ts\n");
    let report = InboundAnalyzer::new(&provider, "origin")
        .analyze()
        .await
        .unwrap();

    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].severity, Severity::Medium);
    assert_eq!(report.summary.medium, 1);
    assert_eq!(report.summary.high, 0);
}

#[tokio::test]
async fn test_disjoint_paths_have_no_conflicts() {
    let provider = FakeProvider::with_diffs("M\tsrc/a.ts\n", "M\tsrc/b.ts\n");
    let report = InboundAnalyzer::new(&provider, "origin")
        .analyze()
        .await
        .unwrap();

    assert_eq!(report.total_inbound, 1);
    assert!(report.conflicts.is_empty());
    assert_eq!(report.summary.file_types.get(".ts"), Some(&1));
}

#[tokio::test]
async fn test_missing_remote_url_degrades_to_instruction() {
    let mut provider = FakeProvider::with_diffs("M\tsrc/a.ts\n", "");
    provider.remote_url = None;
    let report = InboundAnalyzer::new(&provider, "origin")
        .analyze()
        .await
        .unwrap();

    assert!(matches!(report.comparison, ComparisonLink::Instruction { .. }));
    assert_eq!(report.comparison.as_str(), "git diff HEAD..origin/main");
}

#[tokio::test]
async fn test_real_remote_change_conflicts_with_staged_edit() {
    let (_remote_dir, remote) = bare_remote();

    let local = TestRepo::new();
    local.publish_to(&remote);

    let other = TestRepo::clone_from(&remote);
    other.write("README.md", "# changed upstream\n");
    other.write("notes/todo.txt", "ship it\n");
    other.git(&["add", "--all"]);
    other.git(&["commit", "--quiet", "-m", "upstream edits"]);
    other.git(&["push", "--quiet", "origin", "main"]);

    local.write("README.md", "# changed locally\n");
    local.git(&["add", "README.md"]);

    let config = EngineConfig::default();
    let provider = GitCliProvider::new(local.path(), &config);
    let report = InboundAnalyzer::new(&provider, config.remote.clone())
        .analyze()
        .await
        .unwrap();

    assert_eq!(report.branch, "main");
    assert_eq!(report.total_inbound, 2);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].path, "README.md");
    assert_eq!(report.conflicts[0].severity, Severity::High);
    // A filesystem remote has no hosting provider.
    assert_eq!(report.comparison.as_str(), "git diff HEAD..origin/main");
}

#[tokio::test]
async fn test_real_remote_without_new_commits_is_up_to_date() {
    let (_remote_dir, remote) = bare_remote();
    let local = TestRepo::new();
    local.publish_to(&remote);

    let provider = GitCliProvider::new(local.path(), &EngineConfig::default());
    let report = InboundAnalyzer::new(&provider, "origin")
        .analyze()
        .await
        .unwrap();

    assert_eq!(report.total_inbound, 0);
    assert_eq!(report.summary.description, UP_TO_DATE_DESCRIPTION);
}

#[tokio::test]
async fn test_real_fetch_from_unknown_remote_fails() {
    let local = TestRepo::new();
    let provider = GitCliProvider::new(local.path(), &EngineConfig::default());

    let err = InboundAnalyzer::new(&provider, "nowhere")
        .analyze()
        .await
        .unwrap_err();
    assert_eq!(err.code(), "GIT_COMMAND_FAILED");
}
