use async_trait::async_trait;
use clap::Command;
use thiserror::Error;

use crate::github::{MungeConfig, MungeObject, RemoteError};

/// Munger errors
#[derive(Debug, Error)]
pub enum MungerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),
    #[error("{0}")]
    Other(String),
}

/// A named unit of automated action on pull requests
///
/// Mungers are registered by name, a subset is activated at startup and every
/// eligible pull request is handed to the active ones in activation order.
#[async_trait]
pub trait Munger: Send + Sync {
    /// Stable unique name, used as registry key and on the command line
    fn name(&self) -> &str;

    /// Declare extra command line flags; their values arrive in `MungeConfig::matches`
    fn add_flags(&self, cmd: Command) -> Command {
        cmd
    }

    /// One-time setup on activation. An error aborts startup.
    async fn initialize(&mut self, config: &MungeConfig) -> Result<(), MungerError>;

    /// Runs once per poll cycle before any item is processed. An error aborts the cycle.
    async fn each_loop(&mut self, _config: &MungeConfig) -> Result<(), MungerError> {
        Ok(())
    }

    /// Act on one fully enriched pull request. Failures are the munger's to report.
    async fn munge_pull_request(&self, config: &MungeConfig, obj: &MungeObject);
}
