use super::models::{Commit, Event, Issue, PullRequest};

/// Unit of work handed to mungers: the issue plus everything fetched for its PR
///
/// Built fresh for every processing attempt. `commits` and `events` are only
/// filled once the item is known to be an open pull request.
#[derive(Debug, Clone, Default)]
pub struct MungeObject {
    pub issue: Issue,
    pub pr: Option<PullRequest>,
    pub commits: Option<Vec<Commit>>,
    pub events: Option<Vec<Event>>,
}

impl MungeObject {
    pub fn new(issue: Issue) -> Self {
        Self {
            issue,
            pr: None,
            commits: None,
            events: None,
        }
    }

    pub fn number(&self) -> u64 {
        self.issue.number
    }

    pub fn commits(&self) -> &[Commit] {
        self.commits.as_deref().unwrap_or_default()
    }

    pub fn events(&self) -> &[Event] {
        self.events.as_deref().unwrap_or_default()
    }

    pub fn is_enriched(&self) -> bool {
        self.commits.is_some() && self.events.is_some()
    }

    /// Most recent event of the given kind, e.g. "labeled"
    pub fn last_event(&self, kind: &str) -> Option<&Event> {
        self.events().iter().rev().find(|e| e.event == kind)
    }
}
