//! Configuration module
//!
//! Session configuration is read once from the environment at startup and
//! never changes afterwards. Everything downstream receives it by reference.

pub mod identity;

use std::collections::HashMap;

use thiserror::Error;
use url::Url;

pub use identity::{ClientIdentity, DetectionRule, IdentitySource, Signal};

/// Backend base URL
pub const API_URL_VAR: &str = "KBRIDGE_API_URL";
/// Legacy alias for [`API_URL_VAR`], read only when the primary is unset
pub const LEGACY_API_URL_VAR: &str = "KBRIDGE_BACKEND_URL";
/// Backend API key (required)
pub const API_KEY_VAR: &str = "KBRIDGE_API_KEY";
/// Explicit client identity override
pub const CLIENT_NAME_VAR: &str = "KBRIDGE_CLIENT_NAME";

/// Used when neither URL variable is set
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not set. Provide the backend API key in the environment.")]
    MissingApiKey { var: &'static str },

    #[error("{var} contains control characters")]
    InvalidApiKey { var: &'static str },

    #[error("invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Snapshot of environment variables.
///
/// Values are trimmed; empty values are treated as unset.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from literal pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a trimmed, non-empty value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Process-wide session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend base URL, without trailing slash
    pub api_url: String,
    pub api_key: String,
    pub client: ClientIdentity,
}

impl SessionConfig {
    /// Read configuration with priority:
    /// 1. KBRIDGE_API_URL
    /// 2. KBRIDGE_BACKEND_URL (legacy)
    /// 3. built-in default
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        let raw_url = env
            .get(API_URL_VAR)
            .or_else(|| env.get(LEGACY_API_URL_VAR))
            .unwrap_or(DEFAULT_API_URL);
        let api_url = normalize_url(raw_url)?;

        let api_key = env
            .get(API_KEY_VAR)
            .ok_or(ConfigError::MissingApiKey { var: API_KEY_VAR })?
            .to_string();
        if api_key.chars().any(char::is_control) {
            return Err(ConfigError::InvalidApiKey { var: API_KEY_VAR });
        }

        let client = identity::resolve(env);

        Ok(Self {
            api_url,
            api_key,
            client,
        })
    }

    /// Load from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(&Env::from_process())
    }

    /// API key safe for display: first four characters, rest hidden
    pub fn masked_api_key(&self) -> String {
        let visible: String = self.api_key.chars().take(4).collect();
        if self.api_key.chars().count() <= 4 {
            "****".to_string()
        } else {
            format!("{}****", visible)
        }
    }
}

fn normalize_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(trimmed.to_string())
}
