//! Knowledge-base backend client module
//!
//! Provides the HTTP client that forwards tool calls to the backend.

mod client;
mod error;
mod types;

pub use client::{BackendClient, ChatBackend, CHAT_MESSAGE_PATH};
pub use error::BackendError;
pub use types::*;
