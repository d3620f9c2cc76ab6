// crates/cli/src/main.rs
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::{debug, info};

use quizforge_cli::args::{Cli, Command};
use quizforge_cli::commands::{self, Context};
use quizforge_client::{ApiClient, ConsoleConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    quizforge_observability::init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("  \u{2717} {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let mut config = ConsoleConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(secs) = cli.interval {
        config.polling.interval_secs = secs;
    }
    debug!(base_url = %config.api.base_url, interval = ?config.polling.interval(), "Configuration loaded");

    let client = ApiClient::new(&config.api)?;
    let ctx = Context::new(client, config.polling, cli.json);

    let work = async {
        match &cli.command {
            Command::Build {
                activity,
                game,
                no_wait,
            } => commands::build::run(&ctx, *activity, *game, *no_wait).await,
            Command::Batch { plan, build } => commands::batch::run(&ctx, plan, *build).await,
            Command::Watch => commands::watch::run(&ctx).await,
        }
    };

    tokio::select! {
        result = work => result,
        _ = tokio::signal::ctrl_c() => {
            info!(tracked = ctx.registry.len(), "Interrupted, cancelling tracked builds");
            ctx.registry.clear();
            Ok(false)
        }
    }
}
