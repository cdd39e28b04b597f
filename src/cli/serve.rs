//! Serve command - Start the MCP proxy

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use crate::config::SessionConfig;

/// Start the MCP proxy for AI integration
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Transport mode (only stdio is supported)
    #[arg(long, default_value = "stdio")]
    pub transport: String,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    // Configuration errors are fatal before any tool is registered
    let config = Arc::new(SessionConfig::load()?);

    if args.transport != "stdio" {
        anyhow::bail!("Unknown transport: {}. Use 'stdio'.", args.transport);
    }

    eprintln!(
        "🚀 Starting kbridge MCP proxy (backend: {}, client: {})",
        config.api_url, config.client
    );

    crate::mcp::run_stdio(config).await
}

impl ServeArgs {
    /// What a bare `kbridge` invocation runs
    pub fn stdio() -> Self {
        Self {
            transport: "stdio".to_string(),
        }
    }
}
