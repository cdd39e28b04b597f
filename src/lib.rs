//! kbridge - MCP proxy for a remote knowledge base
//!
//! Lets AI coding assistants (GitHub Copilot, Claude Desktop, ...) ask a
//! remote retrieval-augmented knowledge base questions through the Model
//! Context Protocol.
//!
//! ## Key Concepts
//!
//! - **Session configuration**: backend URL, API key and client identity, read
//!   once from the environment and immutable afterwards
//! - **Client identity**: which assistant drives the proxy, sent as `X-Client-Type`
//! - **Two tools**: `ask_question` and `search_knowledge_base`, one backend
//!   call each, always a fresh conversation
//! - **Errors as text**: backend failures reach the assistant as `ERROR: ...`
//!   tool output, never as protocol errors

pub mod cli;
pub mod config;
pub mod mcp;
pub mod remote;

pub use config::{ClientIdentity, Env, SessionConfig};
pub use mcp::{run_stdio, serve, ProxyServer};
pub use remote::{BackendClient, BackendError, ChatBackend};
