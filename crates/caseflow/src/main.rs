//! Caseflow upload task runner
//!
//! Picks up open upload tasks, validates every row of the uploaded CSV and
//! applies the resulting case and incident updates. Tasks run one at a time.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "caseflow", about = "Debt-recovery upload task runner")]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ~/.caseflow/caseflow.toml when present)
    #[arg(short, long, global = true, env = "CASEFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database, overrides `[database] path`
    #[arg(long, global = true, env = "CASEFLOW_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process every open upload task once
    Run {
        /// Keep polling every `poll_interval_secs` until interrupted
        #[arg(short, long)]
        watch: bool,
    },

    /// Show task and upload log counts by status
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match caseflow_logging::init_logging(caseflow_logging::LogConfig {
        app_name: "caseflow",
        verbose: cli.verbose,
        log_dir: None,
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
            None
        }
    };

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let config = cli::config::resolve(cli.config.as_deref(), cli.database)?;

    // Single-threaded: tasks and rows are processed strictly in sequence.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Run { watch } => cli::run::run(cli::run::RunArgs { watch }, config).await,
            Commands::Stats { json } => cli::stats::run(cli::stats::StatsArgs { json }, config).await,
        }
    })
}
