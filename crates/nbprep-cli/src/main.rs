//! nbprep CLI - course notebook processing pipeline.

mod colors;
mod executor;
mod process;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nbprep")]
#[command(about = "Execute, validate, and strip solutions from course notebooks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process notebooks: execute, strip solutions, write student copies
    Process {
        /// File name(s) to process; non-.ipynb paths are ignored
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only check that the notebooks execute, without writing anything
        #[arg(long)]
        check_only: bool,

        /// Skip the sequential-execution gate
        #[arg(long)]
        allow_non_sequential: bool,

        /// Per-notebook execution timeout in seconds
        #[arg(long, default_value = "600")]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Process {
            files,
            check_only,
            allow_non_sequential,
            timeout,
        } => {
            let options = process::Options {
                check_only,
                allow_non_sequential,
                timeout_secs: timeout,
            };
            process::execute(&files, &options).await
        }
    }
}
