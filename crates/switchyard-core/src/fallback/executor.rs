//! Fallback executor
//!
//! Walks the chain strictly in order. Per provider:
//! - auth failures are recorded once and never retried
//! - retriable failures are retried with backoff up to the attempt cap
//! - anything else is recorded and the chain advances
//!
//! Only exhausting the whole chain, cancellation, or an unsupported provider
//! ends the walk with an error.

use super::chain::FallbackConfig;
use crate::error::{Error, ProviderFailure, Result};
use crate::utils::{retry_with_backoff, RetryConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use switchyard_llm::{
    ChatRequest, ChatResult, ErrorClass, Message, ProviderClient, ProviderConfig, ProviderError,
    ProviderErrorKind, ProviderId,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Default bound on one provider call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Winning response plus the failure trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackResult {
    /// Provider response
    pub result: ChatResult,
    /// Provider that answered
    pub used_provider: ProviderId,
    /// Model that answered
    pub used_model: String,
    /// Whether the winner is not the primary
    pub was_fallback: bool,
    /// Every provider tried before the winner, in order
    pub failed_providers: Vec<ProviderFailure>,
}

/// Sequential chain walker
#[derive(Clone)]
pub struct FallbackExecutor {
    client: Arc<dyn ProviderClient>,
    call_timeout: Duration,
    retry: RetryConfig,
    cancel: CancellationToken,
}

impl FallbackExecutor {
    /// Create an executor over a provider client
    #[must_use]
    pub fn new(client: Arc<dyn ProviderClient>) -> Self {
        Self {
            client,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            retry: RetryConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Bound each provider call
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Backoff between same-provider attempts
    ///
    /// The attempt count always comes from the chain's
    /// `max_retries_per_provider`.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Abort in-flight calls when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Cancellation token observed by this executor
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Call the chain until one provider succeeds
    ///
    /// # Errors
    ///
    /// - [`Error::AllProvidersFailed`] with every failure in chain order
    /// - [`Error::UnsupportedProvider`] as soon as a chain member has no adapter
    /// - [`Error::Cancelled`] if the token fires
    #[instrument(
        skip(self, config, messages, system_prompt),
        fields(primary = %config.primary.provider, chain_len = config.chain().len())
    )]
    pub async fn call_with_fallback(
        &self,
        config: &FallbackConfig,
        messages: &[Message],
        system_prompt: &str,
    ) -> Result<FallbackResult> {
        let request = config.request(system_prompt, messages);
        let retry = self
            .retry
            .clone()
            .with_max_attempts(config.max_retries_per_provider);
        let mut failures: Vec<ProviderFailure> = Vec::new();

        for (position, provider) in config.chain().into_iter().enumerate() {
            if !provider.is_supported() {
                return Err(Error::UnsupportedProvider(provider.provider.to_string()));
            }

            let attempt = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(Error::Cancelled),
                r = retry_with_backoff(
                    &retry,
                    |_| self.bounded_call(provider, &request),
                    |e: &ProviderError| e.classify() == ErrorClass::Retriable,
                ) => r,
            };

            match attempt {
                Ok(result) => {
                    let was_fallback = position > 0;
                    if was_fallback {
                        info!(
                            provider = %provider.provider,
                            model = %provider.model,
                            failed = failures.len(),
                            "Fallback provider succeeded"
                        );
                    }
                    return Ok(FallbackResult {
                        result,
                        used_provider: provider.provider.clone(),
                        used_model: provider.model.clone(),
                        was_fallback,
                        failed_providers: failures,
                    });
                }
                Err(retry_err) => {
                    let e = retry_err.last_error;
                    if e.kind == ProviderErrorKind::Unsupported {
                        return Err(Error::UnsupportedProvider(provider.provider.to_string()));
                    }

                    let class = e.classify();
                    let message = match class {
                        ErrorClass::Auth => format!("Authentication failed: {e}"),
                        ErrorClass::Retriable | ErrorClass::Fatal => e.to_string(),
                    };
                    warn!(
                        provider = %provider.provider,
                        model = %provider.model,
                        class = ?class,
                        attempts = retry_err.attempts,
                        error = %message,
                        "Provider failed, advancing chain"
                    );
                    failures.push(ProviderFailure {
                        provider: provider.provider.clone(),
                        model: provider.model.clone(),
                        error: message,
                        class,
                    });
                }
            }
        }

        error!(failures = failures.len(), "Every provider in the chain failed");
        Err(Error::AllProvidersFailed { failures })
    }

    /// Single call to one provider, no retry or fallback
    ///
    /// Used for follow-up turns once a provider has been chosen.
    ///
    /// # Errors
    ///
    /// [`Error::Provider`] on failure, [`Error::Cancelled`] if the token fires.
    pub async fn call_provider(
        &self,
        provider: &ProviderConfig,
        request: &ChatRequest,
    ) -> Result<ChatResult> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            r = self.bounded_call(provider, request) => r.map_err(|source| Error::Provider {
                provider: provider.provider.clone(),
                source,
            }),
        }
    }

    async fn bounded_call(
        &self,
        provider: &ProviderConfig,
        request: &ChatRequest,
    ) -> std::result::Result<ChatResult, ProviderError> {
        match tokio::time::timeout(self.call_timeout, self.client.chat(provider, request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::timeout(self.call_timeout.as_millis() as u64)),
        }
    }
}
