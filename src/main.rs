//! kbridge CLI - Entry point
//!
//! Usage: kbridge [command] [options]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kbridge::cli::{serve::ServeArgs, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing on stderr (stdout carries MCP messages)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("kbridge=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Run command
    match cli.command.unwrap_or(Commands::Serve(ServeArgs::stdio())) {
        Commands::Serve(args) => kbridge::cli::serve::run(args).await,
        Commands::Ask(args) => kbridge::cli::ask::run(args).await,
        Commands::Whoami => kbridge::cli::whoami::run(),
        Commands::McpConfig(args) => kbridge::cli::mcp_config::run(args),
    }
}
