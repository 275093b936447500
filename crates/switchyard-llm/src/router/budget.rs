//! Budget gate
//!
//! Drops providers whose spend today has reached their daily cap. The figures
//! are a snapshot refreshed by the caller before routing; concurrent requests
//! may both pass the gate before either spend is recorded, so the cap is soft.

use super::types::TaskType;
use crate::error::{Error, Result};
use crate::provider::ProviderConfig;
use tracing::debug;

/// Filters providers by remaining daily budget
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetGate;

impl BudgetGate {
    /// Whether a provider still has budget today
    #[must_use]
    pub fn admits(provider: &ProviderConfig) -> bool {
        provider.spent_today < provider.daily_budget
    }

    /// Keep providers with budget remaining
    ///
    /// Returns [`Error::BudgetExhausted`] when `candidates` is non-empty but
    /// every one of them is over budget.
    pub fn filter<'a>(
        candidates: Vec<&'a ProviderConfig>,
        task_type: TaskType,
    ) -> Result<Vec<&'a ProviderConfig>> {
        let (within, exhausted): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|p| Self::admits(p));

        for provider in &exhausted {
            debug!(
                provider = %provider.provider,
                spent = provider.spent_today,
                budget = provider.daily_budget,
                "Provider over daily budget"
            );
        }

        if within.is_empty() && !exhausted.is_empty() {
            return Err(Error::BudgetExhausted {
                task_type,
                providers: exhausted.iter().map(|p| p.provider.clone()).collect(),
            });
        }

        Ok(within)
    }
}
