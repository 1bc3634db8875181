//! gitquill - propose edits to a GitHub-hosted site
//!
//! Main entry point for the gitquill CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{auth, config, repo, serve};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// gitquill - propose edits to a GitHub-hosted site through forks and pull requests
#[derive(Parser)]
#[command(name = "gitquill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration directory (default: platform config dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the token exchange proxy
    Serve(serve::ServeArgs),

    /// GitHub sign-in management
    Auth(auth::AuthArgs),

    /// Fork, branch, commit and open pull requests
    Repo(repo::RepoArgs),

    /// Inspect or initialize configuration
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "gitquill=debug,gitquill_client=debug,gitquill_oauth=debug,gitquill_config=debug,info"
    } else {
        "gitquill=info,gitquill_client=info,gitquill_oauth=info,gitquill_config=warn,warn"
    };

    let log_dir = cli
        .config
        .clone()
        .or_else(gitquill_config::xdg_config_dir)
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "gitquill.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "gitquill=trace,gitquill_client=trace,gitquill_oauth=trace,gitquill_config=trace,info",
                )),
        )
        .init();

    let loaded = gitquill_config::load_config_with_options(None, cli.config.as_deref())?;
    if cli.verbose {
        for path in loaded.loaded_from() {
            tracing::debug!(path = %path.display(), "Loaded config");
        }
    }

    // Create context for commands
    let ctx = commands::Context {
        config: loaded.config,
        config_dir: cli.config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await,
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Repo(args) => repo::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
