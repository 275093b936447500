//! Switchyard LLM - provider model and routing
//!
//! This crate holds everything needed to decide *where* a chat request goes:
//! - Provider: open provider identity, per-provider configuration and the
//!   uniform call interface implemented by the wire adapters
//! - Cost: token estimation and dollar cost approximation
//! - Router: task classification, capability filter, budget gate and the
//!   routing engine that produces a `RoutingDecision`
//!
//! Executing the decision (fallback, retries, tool calls) lives in
//! `switchyard-core`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod cost;
pub mod error;
pub mod message;
pub mod provider;
pub mod router;
pub mod token;
pub mod tools;

pub use completion::{ChatRequest, ChatResult, StopReason, TokenUsage};
pub use cost::{calculate_cost, CostRates};
pub use error::{Error, ErrorClass, ProviderError, ProviderErrorKind, Result};
pub use message::{Message, MessageRole};
pub use provider::{
    CloudProvider, LocalRuntime, ProviderClient, ProviderConfig, ProviderId, ProviderSecurity,
};
pub use router::{
    classify, Alternative, BudgetGate, MockProviderClient, QualityRanking, Router,
    RoutingDecision, RoutingOptions, RoutingSettings, RoutingStrategy, TaskType,
};
pub use token::estimate_tokens;
pub use tools::{ToolCall, ToolChoice, ToolContent, ToolDefinition, ToolOutput, ToolResult};
