//! Cost model - approximate dollar cost of a request
//!
//! This is an estimate used to rank providers, not a billing source of truth.
//!
//! # Module Structure
//!
//! - `pricing`: list prices used when a provider config carries none

mod pricing;

pub use pricing::list_rates;

use crate::provider::ProviderConfig;
use serde::{Deserialize, Serialize};

/// Price per million tokens (USD)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    /// Cost per 1M input tokens
    #[serde(default)]
    pub input: f64,
    /// Cost per 1M output tokens
    #[serde(default)]
    pub output: f64,
}

impl CostRates {
    /// Create rates
    #[must_use]
    pub const fn new(input: f64, output: f64) -> Self {
        Self { input, output }
    }

    /// Whether both rates are zero (free or unpriced)
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.input == 0.0 && self.output == 0.0
    }

    /// Cost for explicit input/output token counts
    #[must_use]
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        let input_cost = (input_tokens as f64 / 1_000_000.0) * self.input;
        let output_cost = (output_tokens as f64 / 1_000_000.0) * self.output;
        input_cost + output_cost
    }
}

/// Estimated cost of `total_tokens` on a provider
///
/// The total is split evenly between input and output before pricing.
#[must_use]
pub fn calculate_cost(provider: &ProviderConfig, total_tokens: usize) -> f64 {
    let half = total_tokens as f64 / 2.0;
    let rates = provider.cost_per_1m;
    (half / 1_000_000.0) * rates.input + (half / 1_000_000.0) * rates.output
}
