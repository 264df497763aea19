//! Cycle runner - one pass over the repository's open issues per poll period

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::WorkerConfig;
use crate::github::{MungeConfig, MungeObject, RemoteError};
use crate::mungers::{MergeabilityPolicy, MungeOutcome, MungerRegistry, RegistryError, munge_issue};
use crate::observability::Metrics;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("per-cycle hook failed: {0}")]
    Hook(#[from] RegistryError),

    #[error("listing open issues failed: {0}")]
    ListIssues(#[from] RemoteError),
}

pub type Result<T> = std::result::Result<T, CycleError>;

/// What one cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub listed: usize,
    pub out_of_range: usize,
    pub dispatched: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Owns the activated registry and runs cycles against it
pub struct Runner {
    registry: MungerRegistry,
    config: MungeConfig,
    policy: MergeabilityPolicy,
    settings: WorkerConfig,
    metrics: Arc<Metrics>,
}

impl Runner {
    pub fn new(
        registry: MungerRegistry,
        config: MungeConfig,
        policy: MergeabilityPolicy,
        settings: WorkerConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            registry,
            config,
            policy,
            settings,
            metrics,
        }
    }

    /// Hooks first, then every open issue in range, one at a time
    ///
    /// A hook failure aborts the cycle before any item is touched. A failed
    /// item is counted and logged; the remaining items still run.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("cycle", %cycle_id);
        self.cycle(cycle_id).instrument(span).await
    }

    async fn cycle(&mut self, cycle_id: Uuid) -> Result<CycleReport> {
        let mut report = CycleReport {
            cycle_id,
            ..Default::default()
        };

        self.registry.run_each_loop(&self.config).await?;

        let issues = self.config.client.list_open_issues().await?;
        report.listed = issues.len();
        info!(issues = issues.len(), "Listed open issues");

        for issue in issues {
            let number = issue.number;
            if !self.settings.in_range(number) {
                report.out_of_range += 1;
                continue;
            }

            let obj = MungeObject::new(issue);
            match munge_issue(&self.registry, &self.config, &self.policy, obj).await {
                Ok(outcome) => {
                    self.metrics.record_outcome(&outcome);
                    match outcome {
                        MungeOutcome::Dispatched { .. } => report.dispatched += 1,
                        _ => report.skipped += 1,
                    }
                }
                Err(e) => {
                    warn!(number, error = %e, "Failed to munge issue, will retry next cycle");
                    self.metrics.item_failed();
                    report.failed += 1;
                }
            }
        }

        info!(
            dispatched = report.dispatched,
            skipped = report.skipped,
            failed = report.failed,
            out_of_range = report.out_of_range,
            "Cycle finished"
        );
        Ok(report)
    }

    /// Run cycles every `period` until `shutdown` resolves
    ///
    /// With `once` set a single cycle runs and its error, if any, is returned.
    /// Otherwise a failed cycle is logged and the next one still runs.
    pub async fn run<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            match self.run_cycle().await {
                Ok(_) => self.metrics.cycle_completed(),
                Err(e) => {
                    self.metrics.cycle_failed();
                    if self.settings.once {
                        return Err(e);
                    }
                    error!(error = %e, "Cycle aborted");
                }
            }

            if self.settings.once {
                info!("Single cycle requested, exiting");
                return Ok(());
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping poll loop");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.settings.period) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{FakeClient, Issue, PullRequest};
    use crate::mungers::SummaryMunger;
    use std::time::Duration;

    fn pr_issue(number: u64) -> Issue {
        Issue {
            number,
            pull_request: Some(Default::default()),
            ..Default::default()
        }
    }

    fn open_pr(number: u64) -> PullRequest {
        PullRequest {
            number,
            merged: Some(false),
            mergeable: Some(true),
            ..Default::default()
        }
    }

    async fn runner(client: Arc<FakeClient>, settings: WorkerConfig) -> (Runner, Arc<Metrics>) {
        let config = MungeConfig::new(client).with_repo("o", "p");
        let mut registry = MungerRegistry::new();
        registry.register(Box::new(SummaryMunger::new())).unwrap();
        registry
            .activate(&["summary".to_string()], &config)
            .await
            .unwrap();

        let metrics = Arc::new(Metrics::new());
        let runner = Runner::new(
            registry,
            config,
            MergeabilityPolicy::default(),
            settings,
            metrics.clone(),
        );
        (runner, metrics)
    }

    #[tokio::test]
    async fn test_cycle_counts_outcomes() {
        let client = Arc::new(FakeClient::new());
        client.add_issue(pr_issue(1));
        client.add_issue(Issue {
            number: 2,
            ..Default::default()
        });
        client.add_issue(pr_issue(3));
        client.add_issue(pr_issue(500));
        client.push_pull_request(1, Some(open_pr(1)));
        client.push_pull_request(3, Some(open_pr(3)));
        client.fail_commits(3, "502");

        let settings = WorkerConfig {
            max_pr_number: 100,
            ..Default::default()
        };
        let (mut runner, metrics) = runner(client.clone(), settings).await;

        let report = runner.run_cycle().await.unwrap();

        assert_eq!(report.listed, 4);
        assert_eq!(report.out_of_range, 1);
        assert_eq!(report.dispatched, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(client.pull_request_fetches(500), 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.items_dispatched, 1);
        assert_eq!(snapshot.items_failed, 1);
    }

    #[tokio::test]
    async fn test_once_runs_single_cycle() {
        let client = Arc::new(FakeClient::new());
        let settings = WorkerConfig {
            once: true,
            ..Default::default()
        };
        let (runner, metrics) = runner(client.clone(), settings).await;

        runner.run(std::future::pending()).await.unwrap();

        assert_eq!(client.list_calls(), 1);
        assert_eq!(metrics.snapshot().cycles_completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_repeats_until_shutdown() {
        let client = Arc::new(FakeClient::new());
        let settings = WorkerConfig {
            period: Duration::from_secs(60),
            ..Default::default()
        };
        let (runner, metrics) = runner(client.clone(), settings).await;

        // Cycles at t=0, 60, 120; shutdown at 150 while sleeping
        runner
            .run(tokio::time::sleep(Duration::from_secs(150)))
            .await
            .unwrap();

        assert_eq!(client.list_calls(), 3);
        assert_eq!(metrics.snapshot().cycles_completed, 3);
    }
}
