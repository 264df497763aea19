//! Remote side of the bot: GitHub models, the client abstraction and the
//! per-run configuration handed to every munger.
//!
//! ## Key Components
//!
//! - [`RemoteClient`] - Read operations the core needs from GitHub
//! - [`GithubClient`] - `reqwest` implementation against the REST v3 API
//! - [`FakeClient`] - Scripted in-memory client for tests
//! - [`MungeObject`] - Issue + PR + commits + events for one item
//! - [`MungeConfig`] - Client and run settings passed to mungers

mod client;
mod fake;
pub mod models;
mod object;

pub use client::{ClientOptions, GithubClient, RemoteClient, RemoteError};
pub use fake::FakeClient;
pub use models::{Commit, CommitFile, Event, Issue, Label, PullRequest, User};
pub use object::MungeObject;

use clap::ArgMatches;
use std::sync::Arc;

/// Everything a munger gets to talk to the remote system
///
/// Holds the shared client, the target repository, the dry-run switch and the
/// parsed command line, where flags declared through `Munger::add_flags` end up.
#[derive(Clone)]
pub struct MungeConfig {
    pub client: Arc<dyn RemoteClient>,
    pub org: String,
    pub project: String,
    pub dry_run: bool,
    pub matches: ArgMatches,
}

impl MungeConfig {
    pub fn new(client: Arc<dyn RemoteClient>) -> Self {
        Self {
            client,
            org: String::new(),
            project: String::new(),
            dry_run: true,
            matches: ArgMatches::default(),
        }
    }

    pub fn with_repo(mut self, org: impl Into<String>, project: impl Into<String>) -> Self {
        self.org = org.into();
        self.project = project.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_matches(mut self, matches: ArgMatches) -> Self {
        self.matches = matches;
        self
    }

    pub fn repo(&self) -> String {
        format!("{}/{}", self.org, self.project)
    }
}
