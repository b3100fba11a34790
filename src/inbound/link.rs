//! Hosting-provider comparison links for inbound changes.

use regex_lite::Regex;
use serde::Serialize;
use tracing::warn;

/// Hosts that get a web comparison link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostingProvider {
    GitHub,
    GitLab,
    Bitbucket,
}

/// Where to look at the inbound changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonLink {
    Url { host: HostingProvider, url: String },
    Instruction { text: String },
}

impl ComparisonLink {
    pub fn as_str(&self) -> &str {
        match self {
            ComparisonLink::Url { url, .. } => url,
            ComparisonLink::Instruction { text } => text,
        }
    }
}

const GITHUB_PATTERN: &str = r"github\.com[:/]([^/:]+)/([^/]+?)(?:\.git)?/?$";
// GitLab owners may be nested groups.
const GITLAB_PATTERN: &str = r"gitlab\.com[:/](.+)/([^/]+?)(?:\.git)?/?$";
const BITBUCKET_PATTERN: &str = r"bitbucket\.(?:org|com)[:/]([^/:]+)/([^/]+?)(?:\.git)?/?$";

/// Build a comparison link for `branch` on `remote`.
///
/// Falls back to a textual `git diff` instruction when the URL is missing,
/// belongs to an unknown host, or the branch is unusable.
pub fn comparison_link(remote_url: Option<&str>, remote: &str, branch: &str) -> ComparisonLink {
    if !is_valid_branch(branch) {
        return ComparisonLink::Instruction {
            text: format!("git fetch {remote} && git diff HEAD..@{{u}}"),
        };
    }

    let fallback = || ComparisonLink::Instruction {
        text: format!("git diff HEAD..{remote}/{branch}"),
    };

    let Some(url) = remote_url.map(str::trim).filter(|u| !u.is_empty()) else {
        return fallback();
    };

    let hosts = [
        (HostingProvider::GitHub, GITHUB_PATTERN),
        (HostingProvider::GitLab, GITLAB_PATTERN),
        (HostingProvider::Bitbucket, BITBUCKET_PATTERN),
    ];

    for (host, pattern) in hosts {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(context = "InboundAnalyzer", ?host, "invalid host pattern: {e}");
                continue;
            }
        };

        if let Some(caps) = re.captures(url) {
            let owner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let repo = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            if owner.is_empty() || repo.is_empty() {
                continue;
            }

            let url = match host {
                HostingProvider::GitHub => {
                    format!("https://github.com/{owner}/{repo}/compare/{branch}")
                }
                HostingProvider::GitLab => {
                    format!("https://gitlab.com/{owner}/{repo}/-/compare?to={branch}")
                }
                HostingProvider::Bitbucket => {
                    format!("https://bitbucket.org/{owner}/{repo}/branches/compare/{branch}")
                }
            };
            return ComparisonLink::Url { host, url };
        }
    }

    fallback()
}

/// A branch name usable in a remote-tracking ref.
pub fn is_valid_branch(branch: &str) -> bool {
    !branch.is_empty()
        && branch != "HEAD"
        && !branch.contains("..")
        && !branch.chars().any(char::is_whitespace)
}
