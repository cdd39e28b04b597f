//! MCP (Model Context Protocol) proxy server
//!
//! Exposes the knowledge-base backend to AI assistants over stdio.
//!
//! # Tools
//! - `ask_question` - General question answered by the backend
//! - `search_knowledge_base` - Question answered from the knowledge base (RAG)

mod jsonrpc;
mod server;
mod tools;

#[cfg(test)]
mod testing;

pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::{run_stdio, serve, Dispatch, ProxyServer, SUPPORTED_PROTOCOL_VERSIONS};
pub use tools::{call_tool, Tool, ToolArgs, ERROR_PREFIX};
