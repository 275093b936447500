//! Switchyard Core - request execution
//!
//! This crate turns a routing decision into a response:
//! - Fallback: chain building and sequential execution with classified retries
//! - Tool loop: bounded multi-turn tool calling on top of the chosen provider
//! - Health: reachability probes and local-runtime detection
//! - Orchestrator: the request-level facade tying routing and execution together

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod fallback;
pub mod health;
pub mod local;
pub mod orchestrator;
pub mod settings;
pub mod tool_loop;
pub mod utils;

pub use error::{Error, ProviderFailure, Result};
pub use fallback::{
    build_fallback_chain, build_local_chain, build_routed_chain, ChainOptions, FallbackConfig,
    FallbackExecutor, FallbackResult, LocalModel,
};
pub use health::{check_provider_health, HealthProber, HealthStatus};
pub use local::{detect_local_providers, LocalDetector, LocalProviders, RuntimeStatus};
pub use orchestrator::{ChatInput, ChatOutcome, Orchestrator, OrchestratorConfig};
pub use settings::{FallbackSettings, TimeoutSettings, ToolLoopSettings};
pub use tool_loop::{LoopExit, ToolError, ToolInvoker, ToolLoop, ToolLoopOutcome};
pub use utils::{retry_with_backoff, RetryConfig, RetryError};
