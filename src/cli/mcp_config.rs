//! `kbridge mcp-config` command
//!
//! Prints the JSON an assistant host needs to launch this proxy, with the
//! current environment embedded. Paste it into the host's config file.
//!
//! # Usage
//! ```bash
//! kbridge mcp-config --target copilot         # .vscode/mcp.json
//! kbridge mcp-config --target claude-desktop  # claude_desktop_config.json
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::{json, Map, Value};

use crate::config::{SessionConfig, API_KEY_VAR, API_URL_VAR, CLIENT_NAME_VAR};

/// Assistant host to generate configuration for
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HostTarget {
    /// GitHub Copilot in VS Code
    Copilot,
    /// Claude Desktop
    ClaudeDesktop,
}

impl HostTarget {
    /// Client identity the host will report
    pub fn client_name(&self) -> &'static str {
        match self {
            HostTarget::Copilot => "github-copilot",
            HostTarget::ClaudeDesktop => "claude-desktop",
        }
    }

    /// Where the snippet usually goes
    pub fn config_hint(&self) -> &'static str {
        match self {
            HostTarget::Copilot => ".vscode/mcp.json (workspace) or the user-level mcp.json",
            HostTarget::ClaudeDesktop => {
                "claude_desktop_config.json (Settings > Developer > Edit Config)"
            }
        }
    }
}

#[derive(Args, Debug)]
pub struct McpConfigArgs {
    /// Host to generate configuration for
    #[arg(short, long, value_enum, default_value = "copilot")]
    pub target: HostTarget,

    /// Server entry name in the host config
    #[arg(long, default_value = "kbridge")]
    pub name: String,
}

pub fn run(args: McpConfigArgs) -> Result<()> {
    let config = SessionConfig::load()?;
    let exe = std::env::current_exe().context("Failed to locate the kbridge executable")?;

    let snippet = host_config(args.target, &args.name, &exe, &config);
    println!("{}", serde_json::to_string_pretty(&snippet)?);
    eprintln!("Add this to {}", args.target.config_hint());

    Ok(())
}

/// Build the host config snippet
pub fn host_config(target: HostTarget, name: &str, exe: &Path, config: &SessionConfig) -> Value {
    let env = json!({
        API_URL_VAR: config.api_url,
        API_KEY_VAR: config.api_key,
        CLIENT_NAME_VAR: target.client_name(),
    });

    let mut entry = json!({
        "command": exe.display().to_string(),
        "args": [],
        "env": env,
    });

    let root_key = match target {
        HostTarget::Copilot => {
            entry["type"] = json!("stdio");
            "servers"
        }
        HostTarget::ClaudeDesktop => "mcpServers",
    };

    let mut servers = Map::new();
    servers.insert(name.to_string(), entry);

    let mut root = Map::new();
    root.insert(root_key.to_string(), Value::Object(servers));
    Value::Object(root)
}
