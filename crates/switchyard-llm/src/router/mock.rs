//! Mock provider client for testing
//!
//! Replies are scripted per provider and consumed in order. A provider with
//! an empty script answers with a default text reply.

use crate::completion::{ChatRequest, ChatResult};
use crate::error::ProviderError;
use crate::provider::{ProviderClient, ProviderConfig, ProviderId};

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Reply = std::result::Result<ChatResult, ProviderError>;

/// One recorded call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Provider that was called
    pub provider: ProviderId,
    /// Model that was requested
    pub model: String,
    /// Request as sent
    pub request: ChatRequest,
}

/// A provider client that returns queued replies or a default one
#[derive(Clone, Default)]
pub struct MockProviderClient {
    scripts: Arc<Mutex<HashMap<ProviderId, VecDeque<Reply>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProviderClient {
    /// Create a mock with no scripted replies
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for a provider
    pub fn push(&self, provider: impl Into<ProviderId>, reply: Reply) {
        self.scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(provider.into())
            .or_default()
            .push_back(reply);
    }

    /// Queue a successful reply
    pub fn push_ok(&self, provider: impl Into<ProviderId>, result: ChatResult) {
        self.push(provider, Ok(result));
    }

    /// Queue a failure
    pub fn push_err(&self, provider: impl Into<ProviderId>, error: ProviderError) {
        self.push(provider, Err(error));
    }

    /// Builder form of [`push`](Self::push)
    #[must_use]
    pub fn with_reply(self, provider: impl Into<ProviderId>, reply: Reply) -> Self {
        self.push(provider, reply);
        self
    }

    /// Every call made so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of calls made to one provider
    #[must_use]
    pub fn call_count(&self, provider: &ProviderId) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| &c.provider == provider)
            .count()
    }

    /// Providers called, in order (repeats included)
    #[must_use]
    pub fn call_order(&self) -> Vec<ProviderId> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|c| c.provider.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ProviderClient for MockProviderClient {
    async fn chat(
        &self,
        provider: &ProviderConfig,
        request: &ChatRequest,
    ) -> std::result::Result<ChatResult, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                provider: provider.provider.clone(),
                model: provider.model.clone(),
                request: request.clone(),
            });

        let scripted = self
            .scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&provider.provider)
            .and_then(VecDeque::pop_front);

        scripted.unwrap_or_else(|| Ok(ChatResult::text("mock response", 0, 0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let mock = MockProviderClient::new();
        mock.push_err("openai", ProviderError::from_status(503, "down"));
        mock.push_ok("openai", ChatResult::text("ok", 1, 2));

        let provider = ProviderConfig::new("openai", "gpt");
        let request = ChatRequest::new("", vec![Message::user("hi")]);

        assert!(mock.chat(&provider, &request).await.is_err());
        assert_eq!(mock.chat(&provider, &request).await.unwrap().content, "ok");
        // script exhausted: default reply
        assert_eq!(
            mock.chat(&provider, &request).await.unwrap().content,
            "mock response"
        );
        assert_eq!(mock.call_count(&provider.provider), 3);
    }

    #[tokio::test]
    async fn test_scripts_are_per_provider() {
        let mock = MockProviderClient::new()
            .with_reply("anthropic", Ok(ChatResult::text("claude", 0, 0)));
        let request = ChatRequest::new("", vec![]);

        let openai = ProviderConfig::new("openai", "gpt");
        let anthropic = ProviderConfig::new("anthropic", "claude");
        assert_eq!(mock.chat(&openai, &request).await.unwrap().content, "mock response");
        assert_eq!(mock.chat(&anthropic, &request).await.unwrap().content, "claude");
        assert_eq!(
            mock.call_order(),
            vec![openai.provider.clone(), anthropic.provider.clone()]
        );
    }
}
