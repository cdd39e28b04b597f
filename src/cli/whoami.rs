//! `kbridge whoami` command
//!
//! Shows what a tool call would send: backend, masked key and client identity.

use anyhow::Result;
use colored::Colorize;

use crate::config::SessionConfig;
use crate::remote::CHAT_MESSAGE_PATH;

pub fn run() -> Result<()> {
    let config = SessionConfig::load()?;

    println!("{}", "kbridge session".bold());
    println!("{}", "─".repeat(40));
    println!(
        "  {} {}{}",
        "Backend: ".dimmed(),
        config.api_url.cyan(),
        CHAT_MESSAGE_PATH.dimmed()
    );
    println!("  {} {}", "API key: ".dimmed(), config.masked_api_key());
    println!(
        "  {} {} {}",
        "Client:  ".dimmed(),
        config.client.label().green().bold(),
        format!("({})", config.client.source()).dimmed()
    );

    Ok(())
}
