//! snapbot - periodic ZFS snapshots with tiered retention

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli_lib::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;

mod cmd;

/// Take and prune tiered ZFS snapshots; run from cron every minute
#[derive(Parser)]
#[command(name = "snapbot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to daily rotating files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one snapshot and retention pass (default)
    Run {
        /// Log what would be created and destroyed without changing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print an annotated example configuration
    Example,
    /// Check the configuration file and show the resolved targets
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = cli_lib::logging::init(cli.verbose, cli.log_dir.as_deref())?;

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => cmd::run::run(&cli.config, dry_run),
        Commands::Config(ConfigCommands::Example) => cmd::config::run_example(),
        Commands::Config(ConfigCommands::Validate) => cmd::config::run_validate(&cli.config),
    }
}
