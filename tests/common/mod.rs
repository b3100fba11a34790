//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use async_trait::async_trait;
use git2::Repository;

use sheaf::{FileStatus, GitProvider, ProviderError, RawChange, RepoStatus};

/// Scripted in-memory provider that records every call in order.
#[derive(Default)]
pub struct FakeProvider {
    pub changes: Vec<RawChange>,
    pub branch: String,
    pub remote_url: Option<String>,
    pub inbound_diff: String,
    pub local_diff: String,
    /// 1-based commit call that should fail.
    pub fail_commit_on: Option<usize>,
    /// 1-based stage call that should fail.
    pub fail_stage_on: Option<usize>,
    pub calls: Mutex<Vec<String>>,
    commits: Mutex<usize>,
    stages: Mutex<usize>,
}

impl FakeProvider {
    pub fn with_changes(changes: Vec<RawChange>) -> Self {
        Self {
            changes,
            branch: "main".to_string(),
            ..Default::default()
        }
    }

    pub fn with_diffs(inbound: &str, local: &str) -> Self {
        Self {
            branch: "main".to_string(),
            remote_url: Some("git@github.com:acme/app.git".to_string()),
            inbound_diff: inbound.to_string(),
            local_diff: local.to_string(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_named(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GitProvider for FakeProvider {
    async fn status(&self) -> Result<RepoStatus, ProviderError> {
        self.record("status".to_string());
        Ok(RepoStatus {
            branch: self.branch.clone(),
            dirty: !self.changes.is_empty(),
            staged: 0,
            unstaged: self.changes.len(),
            untracked: 0,
        })
    }

    async fn get_all_changes(&self) -> Result<Vec<RawChange>, ProviderError> {
        self.record("get_all_changes".to_string());
        Ok(self.changes.clone())
    }

    async fn stage(&self, paths: &[String]) -> Result<(), ProviderError> {
        self.record(format!("stage {}", paths.join(",")));
        let mut n = self.stages.lock().unwrap();
        *n += 1;
        if self.fail_stage_on == Some(*n) {
            return Err(ProviderError::rejected("STAGE_FAILED", "pathspec did not match"));
        }
        Ok(())
    }

    async fn commit(&self, message: &str, paths: &[String]) -> Result<String, ProviderError> {
        self.record(format!("commit {message} -- {}", paths.join(",")));
        let mut n = self.commits.lock().unwrap();
        *n += 1;
        if self.fail_commit_on == Some(*n) {
            return Err(ProviderError::rejected("COMMIT_FAILED", "commit-msg hook rejected"));
        }
        Ok(format!("h{}", *n))
    }

    async fn reset_soft(&self, target: &str) -> Result<(), ProviderError> {
        self.record(format!("reset_soft {target}"));
        Ok(())
    }

    async fn fetch(&self, remote: &str) -> Result<(), ProviderError> {
        self.record(format!("fetch {remote}"));
        Ok(())
    }

    async fn get_remote_url(&self, remote: &str) -> Result<String, ProviderError> {
        self.record(format!("get_remote_url {remote}"));
        self.remote_url
            .clone()
            .ok_or_else(|| ProviderError::rejected("NO_REMOTE", format!("no remote {remote}")))
    }

    async fn get_current_branch(&self) -> Result<String, ProviderError> {
        self.record("get_current_branch".to_string());
        Ok(self.branch.clone())
    }

    async fn diff(&self, revisions: &str) -> Result<String, ProviderError> {
        self.record(format!("diff {revisions}"));
        Ok(self.inbound_diff.clone())
    }

    async fn get_diff(&self) -> Result<String, ProviderError> {
        self.record("get_diff".to_string());
        Ok(self.local_diff.clone())
    }
}

pub fn raw(path: &str, status: FileStatus) -> RawChange {
    RawChange {
        path: path.to_string(),
        previous_path: None,
        status,
        additions: 1,
        deletions: 0,
    }
}

/// Run git in `dir`, panicking with stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// A test git repository driven through the git CLI.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
}

impl TestRepo {
    /// Create a repository on `main` with a committed `README.md`.
    pub fn new() -> Self {
        let repo = Self::empty();
        repo.write("README.md", "# test\n");
        repo.git(&["add", "README.md"]);
        repo.git(&["commit", "--quiet", "-m", "init"]);
        repo
    }

    /// Create a repository on an unborn `main` branch.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Self { dir };
        repo.git(&["init", "--quiet"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.configure_identity();
        repo
    }

    /// Whether HEAD points at a commit.
    pub fn has_head(&self) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", "HEAD"])
            .current_dir(self.path())
            .output()
            .expect("Failed to run git")
            .status
            .success()
    }

    /// Install a `commit-msg` hook rejecting messages that contain `needle`.
    #[cfg(unix)]
    pub fn reject_commit_messages_containing(&self, needle: &str) {
        use std::os::unix::fs::PermissionsExt;

        let hook = self.path().join(".git/hooks/commit-msg");
        std::fs::create_dir_all(hook.parent().expect("hooks dir")).expect("Failed to create hooks dir");
        std::fs::write(
            &hook,
            format!("#!/bin/sh\ngrep -qF '{needle}' \"$1\" && exit 1\nexit 0\n"),
        )
        .expect("Failed to write hook");
        std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make hook executable");
    }

    /// Clone `source` into a fresh temp directory.
    pub fn clone_from(source: &Path) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        git(
            dir.path(),
            &["clone", "--quiet", source.to_str().expect("utf-8 path"), "."],
        );
        let repo = Self { dir };
        repo.configure_identity();
        repo
    }

    fn configure_identity(&self) {
        self.git(&["config", "user.name", "Test User"]);
        self.git(&["config", "user.email", "test@example.com"]);
        self.git(&["config", "commit.gpgsign", "false"]);
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self, args: &[&str]) -> String {
        git(self.path(), args)
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"]).trim().to_string()
    }

    /// Add `remote` as `origin` and push `main` to it.
    pub fn publish_to(&self, remote: &Path) {
        self.git(&["remote", "add", "origin", remote.to_str().expect("utf-8 path")]);
        self.git(&["push", "--quiet", "origin", "main"]);
    }

    pub fn open(&self) -> Repository {
        Repository::open(self.path()).expect("Failed to open repo")
    }
}

/// Create a bare repository to act as a remote. Returns (tempdir, path).
pub fn bare_remote() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("remote.git");
    let bare = Repository::init_bare(&path).expect("Failed to init bare repo");
    bare.set_head("refs/heads/main")
        .expect("Failed to point bare HEAD at main");
    (dir, path)
}
