//! Backend API types
//!
//! DTOs for backend communication.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat/message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    /// The question, forwarded untouched. Absent when the tool call had none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Always serialized, always null for requests made by the proxy
    pub conversation_id: Option<String>,
    /// Ask the backend to answer from the knowledge base
    pub use_rag: bool,
}

impl ChatMessageRequest {
    /// Request that opens a new server-side conversation
    pub fn new(message: Option<String>, use_rag: bool) -> Self {
        Self {
            message,
            conversation_id: None,
            use_rag,
        }
    }
}
