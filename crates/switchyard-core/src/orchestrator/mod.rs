//! Orchestrator - request-level facade
//!
//! Route, build the fallback chain, then run the tool loop. When routing
//! reports budget exhaustion the orchestrator retries on local runtimes only,
//! if any are configured or detected.
//!
//! # Module Structure
//!
//! - `config`: ChatInput, ChatOutcome and OrchestratorConfig
//! - `core`: Orchestrator implementation

mod config;
mod core;


pub use config::{ChatInput, ChatOutcome, OrchestratorConfig};
pub use core::Orchestrator;
