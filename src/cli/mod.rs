//! CLI module - Command definitions and handlers

use clap::{Parser, Subcommand};

pub mod ask;
pub mod mcp_config;
pub mod serve;
pub mod whoami;

/// kbridge - MCP proxy for a remote knowledge base
///
/// Started by an AI assistant host (GitHub Copilot, Claude Desktop, ...).
/// Without a subcommand it serves MCP over stdio.
#[derive(Parser, Debug)]
#[command(name = "kbridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve MCP over stdio (default)
    Serve(serve::ServeArgs),

    /// Send one question through the same path a tool call takes
    Ask(ask::AskArgs),

    /// Show the resolved backend URL and client identity
    Whoami,

    /// Print the host configuration snippet that launches this proxy
    McpConfig(mcp_config::McpConfigArgs),
}
