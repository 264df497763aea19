//! Per-item pipeline: resolve PR → merged check → mergeability wait →
//! commit/event enrichment → sequential dispatch to the active mungers.

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::registry::MungerRegistry;
use crate::github::{MungeConfig, MungeObject, PullRequest, RemoteError};

/// How long to wait for GitHub to compute mergeability
///
/// Each retry sleeps `delay` and re-fetches the PR once. Processing continues
/// after the last retry whether or not mergeability became known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeabilityPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for MergeabilityPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_secs(2),
        }
    }
}

/// Result of asking the remote whether an issue is a pull request
#[derive(Debug)]
pub enum PrResolution {
    NotAPullRequest,
    /// The lookup itself failed; indistinguishable from a plain issue for the pipeline
    LookupFailed(RemoteError),
    Resolved(PullRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MungeOutcome {
    NotAPullRequest,
    /// PR lookup failed and the item was skipped without error
    LookupFailed,
    Merged,
    Dispatched { mungers: usize },
}

impl MungeOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, MungeOutcome::Dispatched { .. })
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to fetch commits for #{number}: {source}")]
    Commits {
        number: u64,
        #[source]
        source: RemoteError,
    },
    #[error("failed to fetch events for #{number}: {source}")]
    Events {
        number: u64,
        #[source]
        source: RemoteError,
    },
}

pub async fn resolve_pull_request(config: &MungeConfig, obj: &MungeObject) -> PrResolution {
    match config.client.fetch_pull_request(obj).await {
        Ok(Some(pr)) => PrResolution::Resolved(pr),
        Ok(None) => PrResolution::NotAPullRequest,
        Err(e) => PrResolution::LookupFailed(e),
    }
}

/// Run one issue through the pipeline and hand it to every active munger
///
/// A failed PR lookup is deliberately swallowed and reported as
/// `MungeOutcome::LookupFailed`; a transient error there looks the same as a
/// plain issue. Commit and event fetch failures are returned as errors and no
/// munger sees the item.
pub async fn munge_issue(
    registry: &MungerRegistry,
    config: &MungeConfig,
    policy: &MergeabilityPolicy,
    mut obj: MungeObject,
) -> Result<MungeOutcome, ProcessError> {
    let number = obj.number();

    let pr = match resolve_pull_request(config, &obj).await {
        PrResolution::Resolved(pr) => pr,
        PrResolution::NotAPullRequest => {
            debug!(number, "Issue is not a PR, skipping");
            return Ok(MungeOutcome::NotAPullRequest);
        }
        PrResolution::LookupFailed(e) => {
            warn!(number, error = %e, "PR lookup failed, skipping issue");
            return Ok(MungeOutcome::LookupFailed);
        }
    };

    if pr.is_merged() {
        debug!(number, "PR was merged, may want to reduce per_page so this happens less often");
        return Ok(MungeOutcome::Merged);
    }

    let pr = wait_for_mergeability(config, &obj, pr, policy).await;
    obj.pr = Some(pr);

    let commits = config
        .client
        .fetch_filled_commits(&obj)
        .await
        .map_err(|source| ProcessError::Commits { number, source })?;
    obj.commits = Some(commits);

    let events = config
        .client
        .fetch_all_events(&obj)
        .await
        .map_err(|source| ProcessError::Events { number, source })?;
    obj.events = Some(events);

    let active = registry.active();
    for munger in &active {
        debug!(number, munger = munger.name(), "Dispatching PR");
        munger.munge_pull_request(config, &obj).await;
    }

    Ok(MungeOutcome::Dispatched {
        mungers: active.len(),
    })
}

async fn wait_for_mergeability(
    config: &MungeConfig,
    obj: &MungeObject,
    mut pr: PullRequest,
    policy: &MergeabilityPolicy,
) -> PullRequest {
    let mut retries = 0;

    while !pr.mergeability_known() && retries < policy.max_retries {
        retries += 1;
        debug!(
            number = pr.number,
            title = %pr.title,
            delay_ms = policy.delay.as_millis() as u64,
            "Waiting for mergeability"
        );
        tokio::time::sleep(policy.delay).await;

        match config.client.fetch_pull_request(obj).await {
            Ok(Some(fresh)) => pr = fresh,
            Ok(None) => {
                warn!(number = pr.number, "PR vanished on re-fetch, keeping earlier state")
            }
            Err(e) => {
                warn!(number = pr.number, error = %e, "PR re-fetch failed, keeping earlier state")
            }
        }
    }

    if !pr.mergeability_known() {
        info!(
            number = pr.number,
            retries, "No mergeability for PR after pause, maybe increase the delay"
        );
    }

    pr
}
