//! Orchestrator inputs, outputs and settings

use crate::settings::{FallbackSettings, TimeoutSettings, ToolLoopSettings};
use crate::tool_loop::ToolLoopOutcome;
use serde::{Deserialize, Serialize};
use switchyard_llm::{
    Message, ProviderId, RoutingDecision, RoutingOptions, RoutingStrategy, TaskType, ToolChoice,
    ToolDefinition,
};
use uuid::Uuid;

/// One inbound chat request
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    /// User prompt for this turn
    pub prompt: String,
    /// Prior conversation, oldest first
    pub history: Vec<Message>,
    /// System prompt
    pub system_prompt: String,
    /// Task type, inferred when absent
    pub task_type: Option<TaskType>,
    /// Provider forced by the user
    pub user_override: Option<ProviderId>,
    /// Explicit routing strategy
    pub strategy: Option<RoutingStrategy>,
    /// Tools offered to the model
    pub tools: Vec<ToolDefinition>,
    /// Tool choice
    pub tool_choice: ToolChoice,
}

impl ChatInput {
    /// Create an input with just a prompt
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Set the system prompt
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Set prior conversation
    #[must_use]
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    /// Force a provider
    #[must_use]
    pub fn with_override(mut self, provider: impl Into<ProviderId>) -> Self {
        self.user_override = Some(provider.into());
        self
    }

    /// Set the task type
    #[must_use]
    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Set the routing strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: RoutingStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Offer tools
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub(crate) fn routing_options(&self) -> RoutingOptions {
        RoutingOptions {
            task_type: self.task_type,
            user_override: self.user_override.clone(),
            strategy: self.strategy,
        }
    }
}

/// Result of one handled request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// Request identifier used in logs
    pub request_id: Uuid,
    /// Routing decision; `None` when served by the local-only fallback
    pub decision: Option<RoutingDecision>,
    /// Tool loop outcome
    pub result: ToolLoopOutcome,
}

impl ChatOutcome {
    /// Whether the request was served by the local-only fallback
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        self.decision.is_none()
    }

    /// Final response text
    #[must_use]
    pub fn content(&self) -> &str {
        &self.result.response.result.content
    }
}

/// Orchestrator settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Fallback chain settings
    #[serde(default)]
    pub fallback: FallbackSettings,
    /// Outbound call bounds
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    /// Tool loop settings
    #[serde(default)]
    pub tools: ToolLoopSettings,
}
