use async_trait::async_trait;
use clap::{Arg, ArgAction, Command};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use super::traits::{Munger, MungerError};
use crate::github::{MungeConfig, MungeObject};

const FILES_FLAG: &str = "summary-files";

/// Logs a one-line digest of every eligible pull request
///
/// Read-only; useful as a smoke test of a deployment and as the default
/// munger when nothing else is selected.
#[derive(Debug, Default)]
pub struct SummaryMunger {
    include_files: bool,
    seen_this_cycle: AtomicUsize,
}

impl SummaryMunger {
    pub const NAME: &'static str = "summary";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen_this_cycle(&self) -> usize {
        self.seen_this_cycle.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Munger for SummaryMunger {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn add_flags(&self, cmd: Command) -> Command {
        cmd.arg(
            Arg::new(FILES_FLAG)
                .long(FILES_FLAG)
                .action(ArgAction::SetTrue)
                .help("Include touched file names in the PR summary"),
        )
    }

    async fn initialize(&mut self, config: &MungeConfig) -> Result<(), MungerError> {
        self.include_files = config
            .matches
            .try_get_one::<bool>(FILES_FLAG)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false);
        info!(repo = %config.repo(), include_files = self.include_files, "Summary munger ready");
        Ok(())
    }

    async fn each_loop(&mut self, _config: &MungeConfig) -> Result<(), MungerError> {
        let seen = self.seen_this_cycle.swap(0, Ordering::Relaxed);
        if seen > 0 {
            info!(prs = seen, "Summarized PRs in previous cycle");
        }
        Ok(())
    }

    async fn munge_pull_request(&self, _config: &MungeConfig, obj: &MungeObject) {
        self.seen_this_cycle.fetch_add(1, Ordering::Relaxed);

        let Some(pr) = obj.pr.as_ref() else {
            return;
        };

        let author = obj
            .issue
            .user
            .as_ref()
            .map(|u| u.login.as_str())
            .unwrap_or("unknown");
        let labels: Vec<&str> = obj.issue.labels.iter().map(|l| l.name.as_str()).collect();

        if self.include_files {
            let mut files: Vec<&str> = obj
                .commits()
                .iter()
                .flat_map(|c| c.files.iter().map(|f| f.filename.as_str()))
                .collect();
            files.sort_unstable();
            files.dedup();

            info!(
                number = pr.number,
                author,
                mergeable = ?pr.mergeable,
                commits = obj.commits().len(),
                events = obj.events().len(),
                labels = ?labels,
                files = ?files,
                "PR summary"
            );
        } else {
            info!(
                number = pr.number,
                author,
                mergeable = ?pr.mergeable,
                commits = obj.commits().len(),
                events = obj.events().len(),
                labels = ?labels,
                "PR summary"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{FakeClient, Issue, PullRequest};
    use std::sync::Arc;

    fn config_with_args(args: &[&str]) -> MungeConfig {
        let munger = SummaryMunger::new();
        let matches = munger
            .add_flags(Command::new("mungehub"))
            .try_get_matches_from(args)
            .unwrap();
        MungeConfig::new(Arc::new(FakeClient::new())).with_matches(matches)
    }

    fn enriched(number: u64) -> MungeObject {
        let mut obj = MungeObject::new(Issue {
            number,
            ..Default::default()
        });
        obj.pr = Some(PullRequest {
            number,
            mergeable: Some(true),
            ..Default::default()
        });
        obj.commits = Some(vec![]);
        obj.events = Some(vec![]);
        obj
    }

    #[tokio::test]
    async fn test_initialize_reads_flag() {
        let mut munger = SummaryMunger::new();
        munger
            .initialize(&config_with_args(&["mungehub", "--summary-files"]))
            .await
            .unwrap();
        assert!(munger.include_files);
    }

    #[tokio::test]
    async fn test_initialize_without_declared_flag() {
        let mut munger = SummaryMunger::new();
        let config = MungeConfig::new(Arc::new(FakeClient::new()));
        munger.initialize(&config).await.unwrap();
        assert!(!munger.include_files);
    }

    #[tokio::test]
    async fn test_each_loop_resets_counter() {
        let mut munger = SummaryMunger::new();
        let config = config_with_args(&["mungehub"]);
        munger.initialize(&config).await.unwrap();

        munger.munge_pull_request(&config, &enriched(1)).await;
        munger.munge_pull_request(&config, &enriched(2)).await;
        assert_eq!(munger.seen_this_cycle(), 2);

        munger.each_loop(&config).await.unwrap();
        assert_eq!(munger.seen_this_cycle(), 0);
    }
}
