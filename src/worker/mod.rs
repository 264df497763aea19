//! Poll worker
//!
//! Drives the cycle: per-cycle hooks, list open issues, run every issue in
//! range through the munge pipeline, sleep, repeat.

pub mod runner;

pub use runner::{CycleError, CycleReport, Runner};

use std::time::Duration;

use crate::config::Config;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub period: Duration,
    pub once: bool,
    pub min_pr_number: u64,
    pub max_pr_number: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(10 * 60),
            once: false,
            min_pr_number: 0,
            max_pr_number: u64::MAX,
        }
    }
}

impl WorkerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            period: config.poll.period.as_duration(),
            once: config.poll.once,
            min_pr_number: config.github.min_pr_number,
            max_pr_number: config.github.max_pr_number,
        }
    }

    pub fn in_range(&self, number: u64) -> bool {
        (self.min_pr_number..=self.max_pr_number).contains(&number)
    }
}
