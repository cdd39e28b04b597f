//! In-memory backend for MCP unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::remote::{BackendError, ChatBackend, ChatMessageRequest};

enum Reply {
    Text(String),
    Status(StatusCode, String),
}

/// Records every request and answers with a canned reply
pub(crate) struct FakeBackend {
    reply: Reply,
    requests: Mutex<Vec<ChatMessageRequest>>,
}

impl FakeBackend {
    pub(crate) fn replying(text: &str) -> Self {
        Self {
            reply: Reply::Text(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_with_status(status: u16, body: &str) -> Self {
        Self {
            reply: Reply::Status(
                StatusCode::from_u16(status).unwrap(),
                body.to_string(),
            ),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ChatMessageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn send_message(&self, request: &ChatMessageRequest) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Status(status, body) => Err(BackendError::Status {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
