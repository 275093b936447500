//! Orchestrator core

use super::config::{ChatInput, ChatOutcome, OrchestratorConfig};
use crate::error::Result;
use crate::fallback::{
    build_local_chain, build_routed_chain, ChainOptions, FallbackConfig, FallbackExecutor,
};
use crate::local::{LocalDetector, LocalProviders};
use crate::tool_loop::{ToolInvoker, ToolLoop};
use crate::utils::RetryConfig;
use std::sync::Arc;
use switchyard_llm::{Message, ProviderClient, Router, RoutingDecision};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Request-level facade over routing, fallback and the tool loop
pub struct Orchestrator {
    router: Router,
    client: Arc<dyn ProviderClient>,
    invoker: Arc<dyn ToolInvoker>,
    config: OrchestratorConfig,
    detector: LocalDetector,
    custom_detector: bool,
}

impl Orchestrator {
    /// Create an orchestrator with default settings
    ///
    /// Local detection probes the `base_url` of configured local runtimes,
    /// or their default ports.
    #[must_use]
    pub fn new(
        router: Router,
        client: Arc<dyn ProviderClient>,
        invoker: Arc<dyn ToolInvoker>,
    ) -> Self {
        let config = OrchestratorConfig::default();
        let detector =
            LocalDetector::from_providers(router.providers(), config.timeouts.local_probe());
        Self {
            router,
            client,
            invoker,
            config,
            detector,
            custom_detector: false,
        }
    }

    /// Replace the settings
    ///
    /// A detector set through [`Self::with_detector`] is kept.
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        if !self.custom_detector {
            self.detector = LocalDetector::from_providers(
                self.router.providers(),
                config.timeouts.local_probe(),
            );
        }
        self.config = config;
        self
    }

    /// Replace the local detector
    #[must_use]
    pub fn with_detector(mut self, detector: LocalDetector) -> Self {
        self.detector = detector;
        self.custom_detector = true;
        self
    }

    /// Routing engine
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Settings
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Probe local runtimes, if detection is enabled
    pub async fn detect_local(&self) -> Option<LocalProviders> {
        if self.config.fallback.detect_local {
            Some(self.detector.detect().await)
        } else {
            None
        }
    }

    async fn chain_options(&self) -> ChainOptions {
        let options = ChainOptions::from_settings(&self.config.fallback);
        match self.detect_local().await {
            Some(detected) => options.with_detected(&detected),
            None => options,
        }
    }

    /// Build the fallback chain behind a routing decision
    ///
    /// # Errors
    ///
    /// Fails if the chosen provider is not configured or has no adapter.
    pub async fn build_chain(&self, decision: &RoutingDecision) -> Result<FallbackConfig> {
        let options = self.chain_options().await;
        build_routed_chain(self.router.providers(), decision, &options)
    }

    /// Handle one chat request
    ///
    /// # Errors
    ///
    /// - budget exhaustion when no local runtime can take over
    ///   (check with [`crate::Error::is_budget_exhausted`])
    /// - [`crate::Error::AllProvidersFailed`] when the whole chain failed
    /// - [`crate::Error::Cancelled`] when `cancel` fires
    #[instrument(skip(self, input, cancel), fields(prompt_chars = input.prompt.len()))]
    pub async fn handle(&self, input: ChatInput, cancel: CancellationToken) -> Result<ChatOutcome> {
        let request_id = Uuid::new_v4();
        let options = input.routing_options();

        let (decision, chain) = match self.router.route(&input.prompt, &options) {
            Ok(decision) => {
                let chain = self.build_chain(&decision).await?;
                (Some(decision), chain)
            }
            Err(e) if e.is_budget_exhausted() => {
                let local_options = self.chain_options().await;
                let Some(chain) = build_local_chain(self.router.providers(), &local_options) else {
                    warn!(request_id = %request_id, "Budget exhausted and no local runtime available");
                    return Err(e.into());
                };
                info!(
                    request_id = %request_id,
                    provider = %chain.primary.provider,
                    model = %chain.primary.model,
                    "Budget exhausted; falling back to local runtimes"
                );
                (None, chain)
            }
            Err(e) => return Err(e.into()),
        };

        let ChatInput {
            prompt,
            mut history,
            system_prompt,
            tools,
            tool_choice,
            ..
        } = input;
        let chain = chain.with_tools(tools, tool_choice);

        let timeouts = &self.config.timeouts;
        let executor = FallbackExecutor::new(Arc::clone(&self.client))
            .with_call_timeout(timeouts.provider_call())
            .with_retry(RetryConfig::from_settings(&self.config.fallback))
            .with_cancellation(cancel.clone());
        let tool_loop = ToolLoop::new(Arc::clone(&self.invoker))
            .with_max_iterations(self.config.tools.max_iterations)
            .with_tool_timeout(timeouts.tool_execution())
            .with_cancellation(cancel);

        history.push(Message::user(prompt));
        let result = tool_loop
            .run(&executor, &chain, history, &system_prompt)
            .await?;

        info!(
            request_id = %request_id,
            provider = %result.response.used_provider,
            was_fallback = result.response.was_fallback,
            iterations = result.iterations,
            tokens = result.response.result.usage().total(),
            "Request handled"
        );

        Ok(ChatOutcome {
            request_id,
            decision,
            result,
        })
    }
}
