use clap::{Parser, Subcommand};
use mungehub::config::{Config, HumanDuration};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "mungehub")]
#[command(about = "Pull request munging bot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the repository and run the selected mungers on every open PR
    Run(RunArgs),
    /// Print every registered munger
    List,
}

/// Flags here override the config file and environment
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Mungers to activate, in dispatch order
    #[arg(long, value_delimiter = ',')]
    pub handlers: Option<Vec<String>>,

    /// GitHub organization
    #[arg(long)]
    pub org: Option<String>,

    /// GitHub repository
    #[arg(long)]
    pub project: Option<String>,

    /// Allow mungers to write to GitHub
    #[arg(long)]
    pub no_dry_run: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Time between cycles, e.g. "10m"
    #[arg(long)]
    pub period: Option<HumanDuration>,

    /// Lowest PR number to munge
    #[arg(long)]
    pub min_pr_number: Option<u64>,

    /// Highest PR number to munge
    #[arg(long)]
    pub max_pr_number: Option<u64>,

    /// Address for the status server
    #[arg(long)]
    pub status_addr: Option<SocketAddr>,

    /// Do not start the status server
    #[arg(long)]
    pub no_status: bool,
}

impl RunArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(handlers) = &self.handlers {
            config.munge.handlers = handlers.clone();
        }
        if let Some(org) = &self.org {
            config.github.org = org.clone();
        }
        if let Some(project) = &self.project {
            config.github.project = project.clone();
        }
        if self.no_dry_run {
            config.github.dry_run = false;
        }
        if self.once {
            config.poll.once = true;
        }
        if let Some(period) = self.period {
            config.poll.period = period;
        }
        if let Some(min) = self.min_pr_number {
            config.github.min_pr_number = min;
        }
        if let Some(max) = self.max_pr_number {
            config.github.max_pr_number = max;
        }
        if let Some(addr) = self.status_addr {
            config.status.bind_addr = addr;
        }
        if self.no_status {
            config.status.enabled = false;
        }
    }
}
