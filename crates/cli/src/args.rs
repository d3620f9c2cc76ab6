// crates/cli/src/args.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use quizforge_types::{ActivityId, GameId};

#[derive(Debug, Parser)]
#[command(name = "quizforge", author, version, about = "Build and batch-create quiz activities", long_about = None)]
pub struct Cli {
    /// Path to quizforge.toml (defaults to QUIZFORGE_CONFIG, then the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the status poll interval, in seconds
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    /// Print final snapshots as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug-level logging for quizforge crates
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a build for one activity and follow it
    Build {
        #[arg(long)]
        activity: ActivityId,
        #[arg(long)]
        game: GameId,
        /// Return once the build has been accepted instead of waiting for it
        #[arg(long)]
        no_wait: bool,
    },
    /// Create one activity per (game, question type) combination in a plan file
    Batch {
        #[arg(long)]
        plan: PathBuf,
        /// Start a build for every created activity and wait for all of them
        #[arg(long)]
        build: bool,
    },
    /// List activities, pick up builds already in progress and follow them
    Watch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from([
            "quizforge", "build", "--activity", "7", "--game", "2", "--no-wait", "--json",
        ]);
        assert!(cli.json);
        match cli.command {
            Command::Build {
                activity,
                game,
                no_wait,
            } => {
                assert_eq!((activity, game, no_wait), (7, 2, true));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_batch_with_global_flags() {
        let cli = Cli::parse_from([
            "quizforge", "--interval", "5", "batch", "--plan", "week3.toml", "--build",
        ]);
        assert_eq!(cli.interval, Some(5));
        assert!(matches!(cli.command, Command::Batch { build: true, .. }));
    }
}
