//! Tool-execution loop
//!
//! Wraps a provider call so a model can request tools mid-response:
//!
//! ```text
//! AwaitingModel -> ToolUseRequested -> ExecutingTools -> AwaitingModel -> ... -> Done
//! ```
//!
//! The first call goes through the fallback chain. Follow-up turns go to the
//! provider that answered, without fallback or retry. The loop stops after
//! `max_iterations` provider calls even if the model still wants tools.

use crate::error::{Error, Result};
use crate::fallback::{FallbackConfig, FallbackExecutor, FallbackResult};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use switchyard_llm::{ChatResult, Message, ToolCall, ToolOutput, ToolResult};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Default ceiling on provider calls per request
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Default bound on one tool execution
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// Failure reported by the tool invoker
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// No tool with that name
    #[error("tool not found: {0}")]
    NotFound(String),

    /// The tool ran and failed
    #[error("tool execution failed: {0}")]
    Execution(String),
}

/// External tool-invocation collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Run one tool
    async fn invoke(&self, name: &str, arguments: Value) -> std::result::Result<ToolOutput, ToolError>;
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopExit {
    /// The model stopped asking for tools
    Completed,
    /// Iteration ceiling reached while tools were still requested
    IterationCap,
    /// A follow-up provider call failed; content is from the last good turn
    IterationFailed,
}

/// Final response of the loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolLoopOutcome {
    /// Last response with token usage summed over every call
    pub response: FallbackResult,
    /// Provider calls made
    pub iterations: u32,
    /// Exit condition
    pub exit: LoopExit,
}

/// Bounded multi-turn tool loop
#[derive(Clone)]
pub struct ToolLoop {
    invoker: Arc<dyn ToolInvoker>,
    max_iterations: u32,
    tool_timeout: Duration,
    cancel: CancellationToken,
}

impl ToolLoop {
    /// Create a loop over a tool invoker
    #[must_use]
    pub fn new(invoker: Arc<dyn ToolInvoker>) -> Self {
        Self {
            invoker,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the iteration ceiling (at least 1)
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Bound each tool execution
    #[must_use]
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Abort tool executions when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run the conversation to completion
    ///
    /// # Errors
    ///
    /// Errors from the first (fallback) call propagate unchanged, as does
    /// [`Error::Cancelled`]. Failures after the first call end the loop
    /// early instead.
    #[instrument(skip(self, executor, config, messages, system_prompt), fields(max_iterations = self.max_iterations))]
    pub async fn run(
        &self,
        executor: &FallbackExecutor,
        config: &FallbackConfig,
        messages: Vec<Message>,
        system_prompt: &str,
    ) -> Result<ToolLoopOutcome> {
        let mut accumulator = messages;
        let first = executor
            .call_with_fallback(config, &accumulator, system_prompt)
            .await?;

        let provider = config
            .find(&first.used_provider, &first.used_model)
            .ok_or_else(|| Error::Config(format!("{} is not in the chain", first.used_provider)))?;

        let mut usage = first.result.usage();
        let mut last: ChatResult = first.result.clone();
        let mut iterations: u32 = 1;

        let exit = loop {
            if !last.wants_tool_use() {
                break LoopExit::Completed;
            }
            if iterations >= self.max_iterations {
                warn!(
                    iterations,
                    pending_tools = last.tool_calls.len(),
                    "Tool loop hit the iteration ceiling; returning partial content"
                );
                break LoopExit::IterationCap;
            }

            let results = self.execute_tool_calls(&last.tool_calls).await?;
            accumulator.push(Message::assistant_tool_calls(
                last.content.clone(),
                last.tool_calls.clone(),
            ));
            accumulator.push(Message::tool_results(results));

            let request = config.request(system_prompt, &accumulator);
            match executor.call_provider(provider, &request).await {
                Ok(next) => {
                    usage += next.usage();
                    last = next;
                    iterations += 1;
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    error!(
                        provider = %provider.provider,
                        iterations,
                        error = %e,
                        "Tool loop iteration failed; returning partial content"
                    );
                    break LoopExit::IterationFailed;
                }
            }
        };

        debug!(iterations, exit = ?exit, tokens = usage.total(), "Tool loop finished");

        let result = ChatResult {
            tokens_input: usage.input,
            tokens_output: usage.output,
            ..last
        };
        Ok(ToolLoopOutcome {
            response: FallbackResult { result, ..first },
            iterations,
            exit,
        })
    }

    /// Run every requested call concurrently
    ///
    /// Each failure becomes an error-flagged result for that call only.
    async fn execute_tool_calls(&self, calls: &[ToolCall]) -> Result<Vec<ToolResult>> {
        let futures = calls.iter().map(|call| self.execute_one(call));
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            results = join_all(futures) => Ok(results),
        }
    }

    async fn execute_one(&self, call: &ToolCall) -> ToolResult {
        let arguments = if call.arguments.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&call.arguments).unwrap_or_else(|e| {
                warn!(
                    tool = %call.name,
                    error = %e,
                    arguments = %call.arguments,
                    "Failed to parse tool arguments, using empty object"
                );
                Value::Object(serde_json::Map::new())
            })
        };

        info!(tool = %call.name, call_id = %call.id, "Executing tool");

        match tokio::time::timeout(self.tool_timeout, self.invoker.invoke(&call.name, arguments)).await
        {
            Ok(Ok(output)) => {
                if output.is_error {
                    warn!(tool = %call.name, "Tool reported an error");
                }
                ToolResult::from_output(&call.id, &output)
            }
            Ok(Err(e)) => {
                error!(tool = %call.name, error = %e, "Tool execution failed");
                ToolResult::error(&call.id, e.to_string())
            }
            Err(_) => {
                error!(tool = %call.name, timeout_secs = self.tool_timeout.as_secs(), "Tool execution timed out");
                ToolResult::error(
                    &call.id,
                    format!("tool {} timed out after {}s", call.name, self.tool_timeout.as_secs()),
                )
            }
        }
    }
}
