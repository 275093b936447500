//! Error types for switchyard-llm
//!
//! Two families live here:
//! - [`Error`]: failures of the routing layer itself (budget exhaustion,
//!   unknown providers, bad configuration)
//! - [`ProviderError`]: the structured failure a provider adapter hands back
//!   from a single call, classified into [`ErrorClass`] for the fallback chain

use crate::provider::ProviderId;
use crate::router::TaskType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Routing error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Every capable provider has reached its daily budget
    #[error("budget exhausted for {task_type} across {} capable provider(s)", providers.len())]
    BudgetExhausted {
        /// Task type being routed
        task_type: TaskType,
        /// Capable providers that were over budget
        providers: Vec<ProviderId>,
    },

    /// Provider has no known adapter and no custom base URL
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this is the distinguished budget-exhaustion signal
    #[must_use]
    pub fn is_budget_exhausted(&self) -> bool {
        matches!(self, Self::BudgetExhausted { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Provider call errors
// ============================================================================

/// Closed taxonomy reported by provider adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Credentials rejected
    Authentication,
    /// Rate limit (HTTP 429)
    RateLimited,
    /// Call or connection timed out
    Timeout,
    /// Connection refused, DNS failure, reset
    Network,
    /// 5xx from the provider
    Server,
    /// Provider reports it is overloaded or out of capacity
    Overloaded,
    /// Malformed request, context overflow, bad parameters
    InvalidRequest,
    /// No adapter exists for this provider
    Unsupported,
    /// Anything the adapter could not map
    Other,
}

/// How the fallback chain must react to a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Never retry against the same credentials; advance
    Auth,
    /// Retry the same provider up to the retry cap, then advance
    Retriable,
    /// Advance immediately
    Fatal,
}

/// Structured failure from a single provider call
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub struct ProviderError {
    /// Error category
    pub kind: ProviderErrorKind,
    /// HTTP status if the failure came from a response
    pub status: Option<u16>,
    /// Provider message (already sanitised by the adapter)
    pub message: String,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

const AUTH_PATTERNS: &[&str] = &[
    "401",
    "403",
    "unauthorized",
    "invalid api key",
    "invalid_api_key",
    "authentication",
];

const RETRIABLE_PATTERNS: &[&str] = &[
    "network",
    "timeout",
    "timed out",
    "econnrefused",
    "connection refused",
    "econnreset",
    "enotfound",
    "dns",
    "429",
    "rate limit",
    "500",
    "502",
    "503",
    "504",
    "overloaded",
    "capacity",
    "unavailable",
];

impl ProviderError {
    /// Create a new provider error
    #[must_use]
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Attach an HTTP status
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Build an error from an HTTP status and body
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Authentication,
            408 => ProviderErrorKind::Timeout,
            429 => ProviderErrorKind::RateLimited,
            529 => ProviderErrorKind::Overloaded,
            500..=599 => ProviderErrorKind::Server,
            400..=499 => ProviderErrorKind::InvalidRequest,
            _ => ProviderErrorKind::Other,
        };
        Self::new(kind, message).with_status(status)
    }

    /// Wrap an unstructured message from an adapter that cannot do better
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message)
    }

    /// Timeout after the given number of milliseconds
    #[must_use]
    pub fn timeout(ms: u64) -> Self {
        Self::new(ProviderErrorKind::Timeout, format!("timeout after {ms}ms"))
    }

    /// Classify into auth / retriable / fatal
    ///
    /// Status code wins, then the adapter's kind. Only `Other` errors fall back
    /// to matching the message text.
    #[must_use]
    pub fn classify(&self) -> ErrorClass {
        if let Some(status) = self.status {
            match status {
                401 | 403 => return ErrorClass::Auth,
                408 | 429 | 500..=599 => return ErrorClass::Retriable,
                _ => {}
            }
        }

        match self.kind {
            ProviderErrorKind::Authentication => ErrorClass::Auth,
            ProviderErrorKind::RateLimited
            | ProviderErrorKind::Timeout
            | ProviderErrorKind::Network
            | ProviderErrorKind::Server
            | ProviderErrorKind::Overloaded => ErrorClass::Retriable,
            ProviderErrorKind::InvalidRequest | ProviderErrorKind::Unsupported => {
                ErrorClass::Fatal
            }
            ProviderErrorKind::Other => classify_message(&self.message),
        }
    }
}

fn classify_message(message: &str) -> ErrorClass {
    let lower = message.to_lowercase();
    if AUTH_PATTERNS.iter().any(|p| lower.contains(p)) {
        ErrorClass::Auth
    } else if RETRIABLE_PATTERNS.iter().any(|p| lower.contains(p)) {
        ErrorClass::Retriable
    } else {
        ErrorClass::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wins_over_kind() {
        let err = ProviderError::new(ProviderErrorKind::Other, "boom").with_status(401);
        assert_eq!(err.classify(), ErrorClass::Auth);

        let err = ProviderError::new(ProviderErrorKind::InvalidRequest, "boom").with_status(503);
        assert_eq!(err.classify(), ErrorClass::Retriable);
    }

    #[test]
    fn test_from_status() {
        assert_eq!(
            ProviderError::from_status(403, "forbidden").kind,
            ProviderErrorKind::Authentication
        );
        assert_eq!(
            ProviderError::from_status(429, "slow down").classify(),
            ErrorClass::Retriable
        );
        assert_eq!(
            ProviderError::from_status(400, "bad json").classify(),
            ErrorClass::Fatal
        );
        assert_eq!(
            ProviderError::from_status(529, "overloaded").kind,
            ProviderErrorKind::Overloaded
        );
    }

    #[test]
    fn test_message_fallback_classification() {
        assert_eq!(
            ProviderError::from_message("HTTP 401 Unauthorized").classify(),
            ErrorClass::Auth
        );
        assert_eq!(
            ProviderError::from_message("Invalid API key provided").classify(),
            ErrorClass::Auth
        );
        assert_eq!(
            ProviderError::from_message("503 Service Unavailable").classify(),
            ErrorClass::Retriable
        );
        assert_eq!(
            ProviderError::from_message("model is overloaded").classify(),
            ErrorClass::Retriable
        );
        assert_eq!(
            ProviderError::from_message("connect ECONNREFUSED 127.0.0.1").classify(),
            ErrorClass::Retriable
        );
        assert_eq!(
            ProviderError::from_message("messages: field required").classify(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn test_display_includes_status() {
        let err = ProviderError::from_status(503, "unavailable");
        assert_eq!(err.to_string(), "unavailable (status 503)");
        assert_eq!(ProviderError::timeout(500).to_string(), "timeout after 500ms");
    }

    #[test]
    fn test_budget_exhausted_is_distinguished() {
        let err = Error::BudgetExhausted {
            task_type: TaskType::General,
            providers: vec![],
        };
        assert!(err.is_budget_exhausted());
        assert!(!Error::NotConfigured("x".into()).is_budget_exhausted());
    }
}
