//! Chat request and result types
//!
//! These are the shapes crossing the provider-call boundary: the orchestrator
//! builds a [`ChatRequest`], a wire adapter turns it into whatever its API
//! wants, and hands back a [`ChatResult`].

use crate::message::Message;
use crate::tools::{ToolCall, ToolChoice, ToolDefinition};
use serde::{Deserialize, Serialize};

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens
    pub input: u64,
    /// Output tokens
    pub output: u64,
}

impl TokenUsage {
    /// Total tokens
    #[must_use]
    pub fn total(&self) -> u64 {
        self.input + self.output
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input += rhs.input;
        self.output += rhs.output;
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of the turn
    EndTurn,
    /// Model wants tool results before continuing
    ToolUse,
    /// Output token limit reached
    MaxTokens,
    /// A stop sequence matched
    StopSequence,
}

/// Request passed to the provider-call collaborator
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// System prompt
    pub system_prompt: String,
    /// Messages in the conversation
    pub messages: Vec<Message>,
    /// Available tools (empty = no tool use)
    pub tools: Vec<ToolDefinition>,
    /// Tool choice strategy
    pub tool_choice: ToolChoice,
}

impl ChatRequest {
    /// Create a new chat request
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
            ..Default::default()
        }
    }

    /// Set tools
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Set tool choice
    #[must_use]
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }
}

/// Result of a single provider call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    /// Generated content
    pub content: String,
    /// Input tokens billed
    pub tokens_input: u64,
    /// Output tokens billed
    pub tokens_output: u64,
    /// Stop condition, if the adapter reports one
    #[serde(default)]
    pub stop_reason: Option<StopReason>,
    /// Tool calls requested
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResult {
    /// Plain text result
    #[must_use]
    pub fn text(content: impl Into<String>, tokens_input: u64, tokens_output: u64) -> Self {
        Self {
            content: content.into(),
            tokens_input,
            tokens_output,
            stop_reason: Some(StopReason::EndTurn),
            tool_calls: Vec::new(),
        }
    }

    /// Result asking for tool execution
    #[must_use]
    pub fn tool_use(tool_calls: Vec<ToolCall>, tokens_input: u64, tokens_output: u64) -> Self {
        Self {
            content: String::new(),
            tokens_input,
            tokens_output,
            stop_reason: Some(StopReason::ToolUse),
            tool_calls,
        }
    }

    /// Whether the model stopped to request at least one tool call
    #[must_use]
    pub fn wants_tool_use(&self) -> bool {
        self.stop_reason == Some(StopReason::ToolUse) && !self.tool_calls.is_empty()
    }

    /// Token usage of this call
    #[must_use]
    pub fn usage(&self) -> TokenUsage {
        TokenUsage {
            input: self.tokens_input,
            output: self.tokens_output,
        }
    }
}
