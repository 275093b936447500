//! Fallback - chain building and execution
//!
//! # Module Structure
//!
//! - `chain`: FallbackConfig and the chain builder (primary, cloud
//!   alternatives, local tier)
//! - `executor`: FallbackExecutor walking the chain with classified retries

mod chain;
mod executor;


pub use crate::error::ProviderFailure;
pub use chain::{
    build_fallback_chain, build_local_chain, build_routed_chain, ChainOptions, FallbackConfig,
    LocalModel,
};
pub use executor::{FallbackExecutor, FallbackResult};
