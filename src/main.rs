mod cli;

use clap::{CommandFactory, FromArgMatches};
use cli::{Cli, Commands, RunArgs};
use mungehub::config::Config;
use mungehub::github::{GithubClient, MungeConfig};
use mungehub::mungers::{MungerRegistry, builtin_registry};
use mungehub::observability::Metrics;
use mungehub::server::{self, MungerList, StatusState};
use mungehub::worker::{Runner, WorkerConfig};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let registry = builtin_registry();

    // Mungers declare their own flags on the run subcommand
    let cmd = Cli::command().mut_subcommand("run", |run| registry.add_flags(run));
    let matches = cmd.get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    match cli.command {
        Commands::Run(args) => {
            let run_matches = matches
                .subcommand_matches("run")
                .cloned()
                .unwrap_or_default();
            run(registry, args, run_matches).await?
        }
        Commands::List => {
            for munger in registry.all_registered() {
                println!("{}", munger.name());
            }
        }
    }

    Ok(())
}

async fn run(
    mut registry: MungerRegistry,
    args: RunArgs,
    matches: clap::ArgMatches,
) -> Result<(), AnyError> {
    let mut config = Config::load_unvalidated()?;
    args.apply(&mut config);
    config.validate()?;

    let client = Arc::new(GithubClient::new(config.client_options())?);
    let munge_config = MungeConfig::new(client)
        .with_repo(&config.github.org, &config.github.project)
        .with_dry_run(config.github.dry_run)
        .with_matches(matches);

    info!(
        repo = %munge_config.repo(),
        dry_run = munge_config.dry_run,
        mungers = ?config.munge.handlers,
        "Activating mungers"
    );
    if let Err(e) = registry.activate(&config.munge.handlers, &munge_config).await {
        error!(error = %e, "Munger activation failed");
        return Err(e.into());
    }

    let metrics = Arc::new(Metrics::new());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        server::shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    if config.status.enabled {
        let state = StatusState::new(MungerList::from_registry(&registry), metrics.clone());
        let addr = config.status.bind_addr;
        let shutdown = wait_for_shutdown(shutdown_rx.clone());
        tokio::spawn(async move {
            if let Err(e) = server::run(addr, state, shutdown).await {
                error!(error = %e, "Status server stopped");
            }
        });
    }

    let runner = Runner::new(
        registry,
        munge_config,
        config.mergeability_policy(),
        WorkerConfig::from_config(&config),
        metrics,
    );
    runner.run(wait_for_shutdown(shutdown_rx)).await?;

    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}
