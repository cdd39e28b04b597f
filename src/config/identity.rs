//! Client identity resolution
//!
//! The label sent as `X-Client-Type` is resolved once per process:
//! explicit override, then the detection table in order, then a fallback.

use std::fmt;

use super::{Env, CLIENT_NAME_VAR};

/// Label used when nothing identifies the host
pub const FALLBACK_CLIENT: &str = "mcp-client";

/// Environment signal checked by a detection rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Variable is set and non-empty
    Present(&'static str),
    /// Variable equals the given value
    Equals(&'static str, &'static str),
}

impl Signal {
    fn matches(&self, env: &Env) -> bool {
        match *self {
            Signal::Present(var) => env.get(var).is_some(),
            Signal::Equals(var, expected) => env.get(var) == Some(expected),
        }
    }
}

/// One `(predicate, label)` entry
#[derive(Debug, Clone, Copy)]
pub struct DetectionRule {
    pub signal: Signal,
    pub label: &'static str,
}

/// Known assistant hosts, first match wins
pub const DETECTION_RULES: &[DetectionRule] = &[
    DetectionRule {
        signal: Signal::Present("CLAUDECODE"),
        label: "claude-code",
    },
    DetectionRule {
        signal: Signal::Present("CURSOR_TRACE_ID"),
        label: "cursor",
    },
    DetectionRule {
        signal: Signal::Equals("__CFBundleIdentifier", "com.anthropic.claudefordesktop"),
        label: "claude-desktop",
    },
    DetectionRule {
        signal: Signal::Equals("TERM_PROGRAM", "vscode"),
        label: "github-copilot",
    },
    DetectionRule {
        signal: Signal::Present("VSCODE_PID"),
        label: "github-copilot",
    },
];

/// Where the identity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Override,
    Detected,
    Fallback,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentitySource::Override => write!(f, "override ({})", CLIENT_NAME_VAR),
            IdentitySource::Detected => write!(f, "detected"),
            IdentitySource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Resolved client identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    label: String,
    source: IdentitySource,
}

impl ClientIdentity {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> IdentitySource {
        self.source
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Resolve against the built-in detection table
pub fn resolve(env: &Env) -> ClientIdentity {
    resolve_with(env, DETECTION_RULES)
}

/// Resolve against an explicit rule table
pub fn resolve_with(env: &Env, rules: &[DetectionRule]) -> ClientIdentity {
    if let Some(name) = env.get(CLIENT_NAME_VAR) {
        return ClientIdentity {
            label: name.to_string(),
            source: IdentitySource::Override,
        };
    }

    rules
        .iter()
        .find(|rule| rule.signal.matches(env))
        .map(|rule| ClientIdentity {
            label: rule.label.to_string(),
            source: IdentitySource::Detected,
        })
        .unwrap_or_else(|| ClientIdentity {
            label: FALLBACK_CLIENT.to_string(),
            source: IdentitySource::Fallback,
        })
}
