//! Token estimation
//!
//! Routing only needs an order-of-magnitude token count to price candidates,
//! so a character approximation (~4 chars per token) is used.

/// Average characters per token for the approximation
const CHARS_PER_TOKEN: usize = 4;

/// Approximate token count from character length
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}
