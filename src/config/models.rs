use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub munge: MungeSettings,
    #[serde(default)]
    pub status: StatusConfig,
}

/// Target repository and API access
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub project: String,
    /// API token (loaded from environment, not from config file)
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Only PRs numbered within [min_pr_number, max_pr_number] are munged
    #[serde(default)]
    pub min_pr_number: u64,
    #[serde(default = "default_max_pr_number")]
    pub max_pr_number: u64,
    /// Mungers should not write to GitHub when set
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            org: String::new(),
            project: String::new(),
            token: None,
            per_page: default_per_page(),
            min_pr_number: 0,
            max_pr_number: default_max_pr_number(),
            dry_run: default_dry_run(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_max_pr_number() -> u64 {
    u64::MAX
}

fn default_dry_run() -> bool {
    true
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(60)
}

/// Poll loop settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollConfig {
    #[serde(default = "default_period")]
    pub period: HumanDuration,
    /// Run a single cycle and exit
    #[serde(default)]
    pub once: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            once: false,
        }
    }
}

fn default_period() -> HumanDuration {
    HumanDuration::from_secs(10 * 60)
}

/// Which mungers run and how items are prepared for them
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MungeSettings {
    /// Munger names in dispatch order
    #[serde(default = "default_handlers")]
    pub handlers: Vec<String>,
    #[serde(default = "default_mergeability_delay")]
    pub mergeability_delay: HumanDuration,
    #[serde(default = "default_mergeability_retries")]
    pub mergeability_retries: u32,
}

impl Default for MungeSettings {
    fn default() -> Self {
        Self {
            handlers: default_handlers(),
            mergeability_delay: default_mergeability_delay(),
            mergeability_retries: default_mergeability_retries(),
        }
    }
}

fn default_handlers() -> Vec<String> {
    vec!["summary".to_string()]
}

fn default_mergeability_delay() -> HumanDuration {
    HumanDuration::from_secs(2)
}

fn default_mergeability_retries() -> u32 {
    1
}

/// Status HTTP server
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    #[serde(default = "default_status_enabled")]
    pub enabled: bool,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: default_status_enabled(),
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_status_enabled() -> bool {
    true
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}
