//! Backend HTTP client
//!
//! Async client for the knowledge-base chat API. One attempt per call, no
//! retries, reqwest's default timeouts.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::error::BackendError;
use super::types::ChatMessageRequest;
use crate::config::SessionConfig;

/// Chat endpoint, relative to the configured base URL
pub const CHAT_MESSAGE_PATH: &str = "/api/chat/message";

const API_KEY_HEADER: &str = "X-API-Key";
const CLIENT_TYPE_HEADER: &str = "X-Client-Type";

/// Anything that can answer a chat message
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one message, return the backend's `message` text
    async fn send_message(&self, request: &ChatMessageRequest) -> Result<String, BackendError>;
}

/// HTTP client for the knowledge-base backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    endpoint: Url,
    config: Arc<SessionConfig>,
}

impl BackendClient {
    /// Create new client from session config
    pub fn from_config(config: Arc<SessionConfig>) -> Result<Self> {
        let endpoint = format!("{}{}", config.api_url, CHAT_MESSAGE_PATH);
        let endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Invalid backend URL: {}", endpoint))?;

        let client = Client::builder()
            .user_agent(concat!("kbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// Full URL of the chat endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for BackendClient {
    async fn send_message(&self, request: &ChatMessageRequest) -> Result<String, BackendError> {
        tracing::debug!(
            url = %self.endpoint,
            client = %self.config.client,
            use_rag = request.use_rag,
            "POST chat message"
        );

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(CLIENT_TYPE_HEADER, self.config.client.label())
            .json(request)
            .send()
            .await
            .map_err(BackendError::Network)?;

        let status = resp.status();
        let body = resp.text().await.map_err(BackendError::Network)?;

        if !status.is_success() {
            return Err(BackendError::Status { status, body });
        }

        extract_message(&body)
    }
}

/// Pull the `message` string out of a successful response body
fn extract_message(body: &str) -> Result<String, BackendError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))?;

    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(BackendError::MissingMessage)
}
