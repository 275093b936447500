//! Utility modules for switchyard-core
//!
//! - retry: bounded same-provider retry with exponential backoff

mod retry;

pub use retry::{retry_with_backoff, RetryConfig, RetryError};
