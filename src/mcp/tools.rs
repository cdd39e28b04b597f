//! MCP tools exposed by the proxy
//!
//! Both tools take a single free-text `request` and differ only in the
//! `use_rag` flag forwarded to the backend.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::remote::{ChatBackend, ChatMessageRequest};

/// Prefix of every failure text returned to the assistant
pub const ERROR_PREFIX: &str = "ERROR: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    AskQuestion,
    SearchKnowledgeBase,
}

impl Tool {
    /// Every registered tool, in listing order
    pub const ALL: [Tool; 2] = [Tool::AskQuestion, Tool::SearchKnowledgeBase];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::AskQuestion => "ask_question",
            Tool::SearchKnowledgeBase => "search_knowledge_base",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Backend-side routing flag
    pub fn use_rag(&self) -> bool {
        matches!(self, Tool::SearchKnowledgeBase)
    }

    fn description(&self) -> &'static str {
        match self {
            Tool::AskQuestion => "Ask the knowledge-base assistant a general question and get a Markdown answer. Use for explanations, how-to questions and follow-ups that do not need citations from internal documentation. Each call starts a new conversation, so include all needed context in the request. Example: ask_question({\"request\": \"How do I paginate results with the public API?\"})",
            Tool::SearchKnowledgeBase => "Answer a question from the team's knowledge base (retrieval over internal documentation). Use BEFORE answering questions about internal systems, conventions or past decisions - the answer might already be documented. Each call starts a new conversation. Example: search_knowledge_base({\"request\": \"What is the retry policy for the billing service?\"})",
        }
    }

    /// `tools/list` entry
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": {
                "type": "object",
                "properties": {
                    "request": {
                        "type": "string",
                        "description": "The question or request, in natural language. Include relevant context (language, framework, error messages)."
                    }
                },
                "required": ["request"]
            }
        })
    }
}

/// Tool arguments, shared by both tools
#[derive(Debug, Default, Deserialize)]
pub struct ToolArgs {
    /// Question text, passed through without validation
    #[serde(default)]
    pub request: Option<String>,
}

/// Run one tool call against the backend.
///
/// Never fails: every error comes back as text starting with [`ERROR_PREFIX`].
pub async fn call_tool(backend: &dyn ChatBackend, tool: Tool, args: &Value) -> String {
    let args: ToolArgs = if args.is_null() {
        ToolArgs::default()
    } else {
        match serde_json::from_value(args.clone()) {
            Ok(args) => args,
            Err(e) => return format!("{}Invalid params: {}", ERROR_PREFIX, e),
        }
    };

    let request = ChatMessageRequest::new(args.request, tool.use_rag());

    match backend.send_message(&request).await {
        Ok(text) => {
            tracing::info!(tool = tool.name(), len = text.len(), "tool call succeeded");
            text
        }
        Err(e) => {
            tracing::warn!(tool = tool.name(), kind = e.kind(), error = %e, "tool call failed");
            format!("{}{}", ERROR_PREFIX, e)
        }
    }
}

/// Wrap text as an MCP tool result
pub fn text_result(text: String) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": text
        }]
    })
}
