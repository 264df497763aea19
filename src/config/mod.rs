//! Configuration management for mungehub
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! Command line flags are applied on top by the binary before validation.
//!
//! # Usage
//!
//! ```no_run
//! use mungehub::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Munging {}/{}", config.github.org, config.github.project);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `MUNGEHUB__<section>__<key>`
//!
//! Examples:
//! - `MUNGEHUB__GITHUB__ORG=kubernetes`
//! - `MUNGEHUB__POLL__PERIOD=5m`
//! - `MUNGEHUB__MUNGE__HANDLERS=summary,lgtm`
//!
//! The API token is read from `MUNGEHUB_TOKEN` or `GITHUB_TOKEN`, never from the file.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/mungehub.toml`.
//! This can be overridden using the `MUNGEHUB_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, GithubConfig, MungeSettings, PollConfig, StatusConfig};
pub use validation::ValidationError;

use crate::github::ClientOptions;
use crate::mungers::MergeabilityPolicy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`MUNGEHUB__*`)
    /// 2. TOML file (default: `config/mungehub.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Same sources as [`Config::load`] but unchecked, for callers that apply
    /// command line overrides and then call [`Config::validate`]
    pub fn load_unvalidated() -> Result<Self, ConfigError> {
        Ok(sources::load()?)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Re-check after command line overrides have been applied
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }

    pub fn mergeability_policy(&self) -> MergeabilityPolicy {
        MergeabilityPolicy {
            max_retries: self.munge.mergeability_retries,
            delay: self.munge.mergeability_delay.as_duration(),
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_base: self.github.api_base.clone(),
            org: self.github.org.clone(),
            project: self.github.project.clone(),
            token: self.github.token.clone(),
            per_page: self.github.per_page,
            request_timeout: self.github.request_timeout.as_duration(),
            ..Default::default()
        }
    }
}
