//! In-memory `RemoteClient` with scripted responses
//!
//! Exposed for tests and dry local runs. Pull request lookups are scripted as a
//! queue per issue number: each fetch pops the next response, and the last one
//! repeats once the queue is drained.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::client::{RemoteClient, RemoteError, Result};
use super::models::{Commit, Event, Issue, PullRequest};
use super::object::MungeObject;

type Scripted<T> = std::result::Result<T, String>;

#[derive(Default)]
pub struct FakeClient {
    issues: Mutex<Vec<Issue>>,
    pull_requests: Mutex<HashMap<u64, VecDeque<Scripted<Option<PullRequest>>>>>,
    commits: Mutex<HashMap<u64, Scripted<Vec<Commit>>>>,
    events: Mutex<HashMap<u64, Scripted<Vec<Event>>>>,
    pr_fetches: Mutex<HashMap<u64, usize>>,
    commit_fetches: AtomicUsize,
    event_fetches: AtomicUsize,
    list_calls: AtomicUsize,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&self, issue: Issue) {
        self.issues.lock().unwrap().push(issue);
    }

    pub fn push_pull_request(&self, number: u64, pr: Option<PullRequest>) {
        self.push_pr_response(number, Ok(pr));
    }

    pub fn push_pull_request_error(&self, number: u64, message: &str) {
        self.push_pr_response(number, Err(message.to_string()));
    }

    fn push_pr_response(&self, number: u64, response: Scripted<Option<PullRequest>>) {
        self.pull_requests
            .lock()
            .unwrap()
            .entry(number)
            .or_default()
            .push_back(response);
    }

    pub fn set_commits(&self, number: u64, commits: Vec<Commit>) {
        self.commits.lock().unwrap().insert(number, Ok(commits));
    }

    pub fn fail_commits(&self, number: u64, message: &str) {
        self.commits
            .lock()
            .unwrap()
            .insert(number, Err(message.to_string()));
    }

    pub fn set_events(&self, number: u64, events: Vec<Event>) {
        self.events.lock().unwrap().insert(number, Ok(events));
    }

    pub fn fail_events(&self, number: u64, message: &str) {
        self.events
            .lock()
            .unwrap()
            .insert(number, Err(message.to_string()));
    }

    pub fn pull_request_fetches(&self, number: u64) -> usize {
        self.pr_fetches
            .lock()
            .unwrap()
            .get(&number)
            .copied()
            .unwrap_or(0)
    }

    pub fn commit_fetches(&self) -> usize {
        self.commit_fetches.load(Ordering::Relaxed)
    }

    pub fn event_fetches(&self) -> usize {
        self.event_fetches.load(Ordering::Relaxed)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }
}

fn replay<T: Clone>(response: Option<&Scripted<T>>, default: T) -> Result<T> {
    match response {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(message)) => Err(RemoteError::RequestFailed(message.clone())),
        None => Ok(default),
    }
}

#[async_trait]
impl RemoteClient for FakeClient {
    async fn fetch_pull_request(&self, obj: &MungeObject) -> Result<Option<PullRequest>> {
        let number = obj.number();
        *self.pr_fetches.lock().unwrap().entry(number).or_default() += 1;

        let mut scripts = self.pull_requests.lock().unwrap();
        let Some(queue) = scripts.get_mut(&number) else {
            return Ok(None);
        };

        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        replay(response.as_ref(), None)
    }

    async fn fetch_filled_commits(&self, obj: &MungeObject) -> Result<Vec<Commit>> {
        self.commit_fetches.fetch_add(1, Ordering::Relaxed);
        replay(self.commits.lock().unwrap().get(&obj.number()), Vec::new())
    }

    async fn fetch_all_events(&self, obj: &MungeObject) -> Result<Vec<Event>> {
        self.event_fetches.fetch_add(1, Ordering::Relaxed);
        replay(self.events.lock().unwrap().get(&obj.number()), Vec::new())
    }

    async fn list_open_issues(&self) -> Result<Vec<Issue>> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.issues.lock().unwrap().clone())
    }
}
