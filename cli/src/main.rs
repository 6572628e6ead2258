//! # zfpack Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the zfpack CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! - Each top-level command is a variant in the `Commands` enum
//! - Commands are mapped to handler functions in their respective modules
//! - All errors are propagated to this level, printed once, and turned into exit status 1
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! zfpack --help
//!
//! # Build a zpk with increased verbosity and an explicit configuration file
//! zfpack -vv --config ci.toml build shop.zpk --target ./shop
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level (`RUST_LOG` wins when set)
//! 3. Route to the command handler
//! 4. Print any error chain to stderr and exit with status 1
//!
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter}; // Logging setup

mod commands; // Command handlers (build)
mod common; // Shared utilities (archive, fs, process, network, ...)
mod core; // Core infrastructure (errors, config, templating)

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "zfpack",
    about = "📦 zfpack: Zend Framework application packager",
    long_about = "Package a Zend Framework application as a zip, tar, tar.gz, tgz or\n\
                  Zend Server zpk archive, with module selection, .gitignore filtering\n\
                  and a production Composer install.",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Configuration file replacing the user and project configuration.
    #[arg(long, global = true, env = "ZFPACK_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    #[command(alias = "b")]
    Build(commands::build::BuildArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Build(args) => commands::build::handle_build(args, cli.config).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
