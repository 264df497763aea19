use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub user reference as embedded in issues, commits and events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Marker present on issues that are backed by a pull request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestLinks {
    #[serde(default)]
    pub url: Option<String>,
}

/// Issue record (GitHub stores labels, assignees etc. on the issue with the PR's number)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub pull_request: Option<PullRequestLinks>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }
}

/// Branch reference on a pull request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub sha: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub merged: Option<bool>,
    /// Computed asynchronously by GitHub; `None` until it is known
    #[serde(default)]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub head: Option<GitRef>,
    #[serde(default)]
    pub base: Option<GitRef>,
    #[serde(default)]
    pub additions: Option<u64>,
    #[serde(default)]
    pub deletions: Option<u64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(false)
    }

    pub fn mergeability_known(&self) -> bool {
        self.mergeable.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

/// File touched by a commit, only present on "filled" commits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFile {
    pub filename: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    #[serde(default)]
    pub commit: CommitDetail,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub files: Vec<CommitFile>,
}

/// Issue timeline event (labeled, assigned, merged, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: u64,
    pub event: String,
    #[serde(default)]
    pub actor: Option<User>,
    #[serde(default)]
    pub label: Option<Label>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_with_pull_request_marker() {
        let json = r#"{
            "number": 42,
            "title": "Fix the thing",
            "state": "open",
            "labels": [{"name": "lgtm"}],
            "pull_request": {"url": "https://api.github.com/repos/o/p/pulls/42"}
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.number, 42);
        assert!(issue.is_pull_request());
        assert!(issue.has_label("lgtm"));
        assert!(!issue.has_label("needs-ok-to-merge"));
    }

    #[test]
    fn test_plain_issue_is_not_pull_request() {
        let issue: Issue = serde_json::from_str(r#"{"number": 7}"#).unwrap();
        assert!(!issue.is_pull_request());
        assert!(issue.labels.is_empty());
    }

    #[test]
    fn test_pull_request_null_mergeable() {
        let json = r#"{
            "number": 42,
            "merged": false,
            "mergeable": null,
            "head": {"ref": "feature", "sha": "abc123"}
        }"#;

        let pr: PullRequest = serde_json::from_str(json).unwrap();
        assert!(!pr.is_merged());
        assert!(!pr.mergeability_known());
        assert_eq!(pr.head.unwrap().name, "feature");
    }

    #[test]
    fn test_commit_with_files() {
        let json = r#"{
            "sha": "deadbeef",
            "commit": {"message": "initial", "author": {"name": "a", "email": "a@b.c"}},
            "files": [{"filename": "main.go", "status": "modified", "additions": 3, "deletions": 1}]
        }"#;

        let commit: Commit = serde_json::from_str(json).unwrap();
        assert_eq!(commit.files.len(), 1);
        assert_eq!(commit.files[0].additions, 3);
        assert_eq!(commit.commit.message, "initial");
    }
}
