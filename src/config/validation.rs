use super::models::Config;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("github.{field} must be set")]
    MissingRepository { field: &'static str },

    #[error("github.per_page must be between 1 and 100, got {0}")]
    InvalidPerPage(u32),

    #[error("min_pr_number ({min}) is greater than max_pr_number ({max})")]
    InvalidPrRange { min: u64, max: u64 },

    #[error("A token is required when dry_run is disabled (set MUNGEHUB_TOKEN or GITHUB_TOKEN)")]
    MissingToken,

    #[error("Poll period must be positive")]
    ZeroPollPeriod,

    #[error("No mungers requested (munge.handlers is empty)")]
    NoHandlersRequested,

    #[error("Munger '{0}' is requested more than once")]
    DuplicateHandler(String),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_github(config)?;
    validate_poll(config)?;
    validate_handlers(config)?;
    Ok(())
}

fn validate_github(config: &Config) -> Result<(), ValidationError> {
    let github = &config.github;

    if github.org.trim().is_empty() {
        return Err(ValidationError::MissingRepository { field: "org" });
    }
    if github.project.trim().is_empty() {
        return Err(ValidationError::MissingRepository { field: "project" });
    }
    if github.per_page == 0 || github.per_page > 100 {
        return Err(ValidationError::InvalidPerPage(github.per_page));
    }
    if github.min_pr_number > github.max_pr_number {
        return Err(ValidationError::InvalidPrRange {
            min: github.min_pr_number,
            max: github.max_pr_number,
        });
    }
    if !github.dry_run && github.token.is_none() {
        return Err(ValidationError::MissingToken);
    }

    Ok(())
}

fn validate_poll(config: &Config) -> Result<(), ValidationError> {
    if config.poll.period.is_zero() {
        return Err(ValidationError::ZeroPollPeriod);
    }
    Ok(())
}

/// Names are resolved against the registry at activation; here only the list shape is checked
fn validate_handlers(config: &Config) -> Result<(), ValidationError> {
    if config.munge.handlers.is_empty() {
        return Err(ValidationError::NoHandlersRequested);
    }

    let mut seen = HashSet::new();
    for name in &config.munge.handlers {
        if !seen.insert(name.as_str()) {
            return Err(ValidationError::DuplicateHandler(name.clone()));
        }
    }

    Ok(())
}
