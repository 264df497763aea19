//! GitHub REST client used by the item processor and the poll loop

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::models::{Commit, Event, Issue, PullRequest};
use super::object::MungeObject;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("GitHub returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Read operations the core needs from the remote system
///
/// Implementations own all network state; nothing fetched here is cached
/// beyond the processing of a single item.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Resolve the pull request behind an issue, `Ok(None)` if it is a plain issue
    async fn fetch_pull_request(&self, obj: &MungeObject) -> Result<Option<PullRequest>>;

    /// All commits of the PR, each filled in with its touched files
    async fn fetch_filled_commits(&self, obj: &MungeObject) -> Result<Vec<Commit>>;

    /// Every issue event recorded on the PR
    async fn fetch_all_events(&self, obj: &MungeObject) -> Result<Vec<Event>>;

    /// Open issues (and PRs) of the repository, oldest first
    async fn list_open_issues(&self) -> Result<Vec<Issue>>;
}

/// GitHub client configuration
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_base: String,
    pub org: String,
    pub project: String,
    pub token: Option<String>,
    pub per_page: u32,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            org: String::new(),
            project: String::new(),
            token: None,
            per_page: 100,
            request_timeout: Duration::from_secs(60),
            user_agent: "mungehub/0.1.0".to_string(),
        }
    }
}

pub struct GithubClient {
    client: Client,
    options: ClientOptions,
}

impl GithubClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.request_timeout)
            .user_agent(&options.user_agent)
            .build()
            .map_err(|e| RemoteError::RequestFailed(e.to_string()))?;

        Ok(Self { client, options })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.options.api_base.trim_end_matches('/'),
            self.options.org,
            self.options.project,
            path
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(url, "GitHub request");

        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .query(query);

        if let Some(token) = &self.options.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Timeout
            } else {
                RemoteError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::FORBIDDEN {
                warn!(url, "GitHub refused request, rate limit may be exhausted");
            }
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// Walk `page=1..` until a short page comes back
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let per_page = self.options.per_page.max(1);
        let mut out = Vec::new();
        let mut page = 1u32;

        loop {
            let mut params = query.to_vec();
            params.push(("per_page", per_page.to_string()));
            params.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(url, &params).await?;
            let received = batch.len();
            out.extend(batch);

            if received < per_page as usize {
                break;
            }
            page += 1;
        }

        debug!(url, pages = page, items = out.len(), "Fetched all pages");
        Ok(out)
    }
}

#[async_trait]
impl RemoteClient for GithubClient {
    async fn fetch_pull_request(&self, obj: &MungeObject) -> Result<Option<PullRequest>> {
        if !obj.issue.is_pull_request() {
            return Ok(None);
        }

        let url = self.repo_url(&format!("pulls/{}", obj.number()));
        let pr = self.get_json::<PullRequest>(&url, &[]).await?;
        Ok(Some(pr))
    }

    async fn fetch_filled_commits(&self, obj: &MungeObject) -> Result<Vec<Commit>> {
        let url = self.repo_url(&format!("pulls/{}/commits", obj.number()));
        let listed: Vec<Commit> = self.get_all_pages(&url, &[]).await?;

        // The PR commit listing omits files, fetch each commit individually
        let mut filled = Vec::with_capacity(listed.len());
        for commit in listed {
            let url = self.repo_url(&format!("commits/{}", commit.sha));
            filled.push(self.get_json::<Commit>(&url, &[]).await?);
        }

        Ok(filled)
    }

    async fn fetch_all_events(&self, obj: &MungeObject) -> Result<Vec<Event>> {
        let url = self.repo_url(&format!("issues/{}/events", obj.number()));
        self.get_all_pages(&url, &[]).await
    }

    async fn list_open_issues(&self) -> Result<Vec<Issue>> {
        let url = self.repo_url("issues");
        let query = [
            ("state", "open".to_string()),
            ("sort", "created".to_string()),
            ("direction", "asc".to_string()),
        ];
        self.get_all_pages(&url, &query).await
    }
}
