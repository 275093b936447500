//! Routing engine
//!
//! Combines the classifier, capability filter, budget gate and cost model into
//! one [`RoutingDecision`] per request.

use super::budget::BudgetGate;
use super::capability::capable_providers;
use super::classifier::classify;
use super::rules::{quality_note, RoutingSettings};
use super::types::{Alternative, RoutingDecision, RoutingStrategy, TaskType};
use crate::cost::calculate_cost;
use crate::error::{Error, Result};
use crate::provider::{ProviderConfig, ProviderId};
use crate::token::estimate_tokens;
use std::cmp::Ordering;
use tracing::{debug, info, instrument, warn};

/// Maximum runner-ups reported on a decision
const MAX_ALTERNATIVES: usize = 2;

/// Per-request routing inputs besides the prompt
#[derive(Debug, Clone, Default)]
pub struct RoutingOptions {
    /// Task type, inferred from the prompt when absent
    pub task_type: Option<TaskType>,
    /// Provider forced by the user
    pub user_override: Option<ProviderId>,
    /// Explicit sort strategy
    pub strategy: Option<RoutingStrategy>,
}

impl RoutingOptions {
    /// Set the task type
    #[must_use]
    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Force a provider
    #[must_use]
    pub fn with_override(mut self, provider: impl Into<ProviderId>) -> Self {
        self.user_override = Some(provider.into());
        self
    }

    /// Set the sort strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: RoutingStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

/// Routing engine over a snapshot of provider configurations
///
/// `spent_today` figures are read as given; refreshing them before routing is
/// the caller's job.
#[derive(Debug, Clone)]
pub struct Router {
    providers: Vec<ProviderConfig>,
    settings: RoutingSettings,
}

impl Router {
    /// Create a router with default settings
    #[must_use]
    pub fn new(providers: Vec<ProviderConfig>) -> Self {
        Self {
            providers,
            settings: RoutingSettings::default(),
        }
    }

    /// Replace the routing settings
    #[must_use]
    pub fn with_settings(mut self, settings: RoutingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Configured providers
    #[must_use]
    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }

    /// Routing settings
    #[must_use]
    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    /// Look up a configured provider
    #[must_use]
    pub fn get(&self, provider: &ProviderId) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| &p.provider == provider)
    }

    /// Pick a provider for `prompt`
    ///
    /// # Errors
    ///
    /// - [`Error::BudgetExhausted`] when capable providers exist but all are
    ///   over their daily budget
    /// - [`Error::NotConfigured`] when no configured, callable provider can
    ///   serve the task
    /// - [`Error::UnsupportedProvider`] when the override names a provider no
    ///   adapter can reach
    #[instrument(skip(self, prompt), fields(prompt_chars = prompt.len()))]
    pub fn route(&self, prompt: &str, options: &RoutingOptions) -> Result<RoutingDecision> {
        let tokens = estimate_tokens(prompt);

        if let Some(wanted) = &options.user_override {
            if let Some(provider) = self.get(wanted) {
                return self.route_override(provider, prompt, tokens, options);
            }
            warn!(provider = %wanted, "Override names an unconfigured provider; routing normally");
        }

        let task_type = options.task_type.unwrap_or_else(|| classify(prompt));

        let mut capable = capable_providers(&self.providers, task_type, &self.settings);
        capable.retain(|p| {
            let supported = p.is_supported();
            if !supported {
                warn!(provider = %p.provider, "Skipping provider with no adapter");
            }
            supported
        });
        if capable.is_empty() {
            return Err(Error::NotConfigured(format!(
                "no provider can serve {task_type}"
            )));
        }

        let mut candidates: Vec<(&ProviderConfig, f64)> = BudgetGate::filter(capable, task_type)?
            .into_iter()
            .map(|p| (p, calculate_cost(p, tokens)))
            .collect();

        let strategy = self.effective_strategy(task_type, options.strategy);
        match strategy {
            RoutingStrategy::CostOptimized => {
                candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
            }
            RoutingStrategy::QualityOptimized => {
                let ranking = &self.settings.quality_ranking;
                candidates.sort_by_key(|(p, _)| ranking.rank(&p.provider));
            }
        }

        let mut ranked = candidates.into_iter();
        let Some((chosen, estimated_cost)) = ranked.next() else {
            return Err(Error::NotConfigured(format!(
                "no provider can serve {task_type}"
            )));
        };
        let alternatives: Vec<Alternative> = ranked
            .take(MAX_ALTERNATIVES)
            .map(|(p, cost)| Alternative {
                provider: p.provider.clone(),
                estimated_cost: cost,
            })
            .collect();

        let mut reasoning = vec![task_type.routing_note().to_string()];
        if let Some(note) = quality_note(&chosen.provider) {
            reasoning.push(note.to_string());
        }
        if chosen.remaining_budget() < self.settings.low_budget_ratio * chosen.daily_budget {
            reasoning.push(format!(
                "Low budget remaining: ${:.2} of ${:.2}",
                chosen.remaining_budget(),
                chosen.daily_budget
            ));
        }

        info!(
            provider = %chosen.provider,
            model = %chosen.model,
            task_type = %task_type,
            strategy = ?strategy,
            estimated_cost,
            alternatives = alternatives.len(),
            "Routed request"
        );

        Ok(RoutingDecision::new(
            chosen.provider.clone(),
            chosen.model.clone(),
            reasoning,
            estimated_cost,
            alternatives,
            task_type,
        ))
    }

    fn route_override(
        &self,
        provider: &ProviderConfig,
        prompt: &str,
        tokens: usize,
        options: &RoutingOptions,
    ) -> Result<RoutingDecision> {
        if !provider.is_supported() {
            return Err(Error::UnsupportedProvider(provider.provider.to_string()));
        }

        let task_type = options.task_type.unwrap_or_else(|| classify(prompt));
        info!(provider = %provider.provider, model = %provider.model, "Routing by user override");

        Ok(RoutingDecision::new(
            provider.provider.clone(),
            provider.model.clone(),
            vec!["User override".to_string()],
            calculate_cost(provider, tokens),
            Vec::new(),
            task_type,
        ))
    }

    fn effective_strategy(
        &self,
        task_type: TaskType,
        explicit: Option<RoutingStrategy>,
    ) -> RoutingStrategy {
        if let Some(strategy) = explicit {
            return strategy;
        }
        if task_type == TaskType::DeepReasoning {
            return RoutingStrategy::QualityOptimized;
        }
        if let Some(strategy) = self.settings.default_strategy {
            debug!(?strategy, "Using configured default strategy");
            return strategy;
        }
        RoutingStrategy::CostOptimized
    }
}
