//! Error types for switchyard-core

use serde::{Deserialize, Serialize};
use std::fmt;
use switchyard_llm::{ErrorClass, ProviderError, ProviderId};
use thiserror::Error;

/// One provider attempt that did not win
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// Provider that failed
    pub provider: ProviderId,
    /// Model that was requested
    pub model: String,
    /// Failure message as recorded
    pub error: String,
    /// How the failure was classified
    pub class: ErrorClass,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

fn list_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Routing error (including budget exhaustion)
    #[error("llm error: {0}")]
    Llm(#[from] switchyard_llm::Error),

    /// Every provider in the chain failed
    #[error("all providers failed: {}", list_failures(failures))]
    AllProvidersFailed {
        /// Failures in chain order
        failures: Vec<ProviderFailure>,
    },

    /// A single provider call failed outside the fallback chain
    #[error("provider {provider} failed: {source}")]
    Provider {
        /// Provider that was called
        provider: ProviderId,
        /// Structured failure
        #[source]
        source: ProviderError,
    },

    /// Provider has no adapter and no custom base URL
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The request was cancelled by the caller
    #[error("request cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this wraps the budget-exhaustion signal
    #[must_use]
    pub fn is_budget_exhausted(&self) -> bool {
        matches!(self, Self::Llm(e) if e.is_budget_exhausted())
    }

    /// Failure trail, if the whole chain was exhausted
    #[must_use]
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            Self::AllProvidersFailed { failures } => failures,
            _ => &[],
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_llm::TaskType;

    #[test]
    fn test_all_providers_failed_lists_every_pair() {
        let err = Error::AllProvidersFailed {
            failures: vec![
                ProviderFailure {
                    provider: "anthropic".into(),
                    model: "claude".into(),
                    error: "Authentication failed: invalid api key".into(),
                    class: ErrorClass::Auth,
                },
                ProviderFailure {
                    provider: "openai".into(),
                    model: "gpt".into(),
                    error: "service unavailable (status 503)".into(),
                    class: ErrorClass::Retriable,
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("anthropic: Authentication failed"));
        assert!(msg.find("anthropic").unwrap() < msg.find("openai: service unavailable").unwrap());
        assert_eq!(err.failures().len(), 2);
    }

    #[test]
    fn test_budget_signal_survives_wrapping() {
        let err: Error = switchyard_llm::Error::BudgetExhausted {
            task_type: TaskType::General,
            providers: vec!["openai".into()],
        }
        .into();
        assert!(err.is_budget_exhausted());
        assert!(!Error::Cancelled.is_budget_exhausted());
    }
}
