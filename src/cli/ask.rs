//! `kbridge ask` command
//!
//! Sends one question through the same path an MCP tool call takes.
//!
//! # Usage
//! ```bash
//! kbridge ask "How do we version the public API?"
//! kbridge ask --search "What is the retry policy for billing?"
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::config::SessionConfig;
use crate::mcp::{call_tool, Tool, ERROR_PREFIX};
use crate::remote::BackendClient;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question text
    pub question: String,

    /// Answer from the knowledge base (same as the search_knowledge_base tool)
    #[arg(short, long)]
    pub search: bool,
}

pub async fn run(args: AskArgs) -> Result<()> {
    let config = Arc::new(SessionConfig::load()?);
    let client = BackendClient::from_config(config)?;

    let tool = if args.search {
        Tool::SearchKnowledgeBase
    } else {
        Tool::AskQuestion
    };

    let text = call_tool(&client, tool, &json!({ "request": args.question })).await;

    if let Some(err) = text.strip_prefix(ERROR_PREFIX) {
        anyhow::bail!("{}", err);
    }

    println!("{}", text);
    Ok(())
}
