//! Application configuration
//!
//! One TOML document covers routing, fallback, timeouts, the tool loop and
//! the provider list. See `config/default.toml` for every key.

mod loader;

pub use loader::{load_config, DEFAULT_CONFIG};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use switchyard_core::{FallbackSettings, LocalDetector, TimeoutSettings, ToolLoopSettings};
use switchyard_llm::cost::list_rates;
use switchyard_llm::{ProviderConfig, Router, RoutingSettings};
use tracing::{debug, warn};

static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .expect("env reference pattern is a compile-time constant")
});

/// Whole application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub routing: RoutingSettings,
    #[serde(default)]
    pub fallback: FallbackSettings,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    #[serde(default)]
    pub tools: ToolLoopSettings,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl AppConfig {
    /// Expand `${VAR}` references and fill in list prices
    ///
    /// Unset variables expand to an empty string. Providers that configure
    /// no price get the list price of their provider, when one is known.
    pub fn resolve(self) -> Self {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    fn resolve_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for provider in &mut self.providers {
            provider.api_key = expand_env(&provider.api_key, &lookup);
            if let Some(url) = provider.base_url.take() {
                provider.base_url = Some(expand_env(&url, &lookup));
            }

            if provider.cost_per_1m.is_zero() && !provider.runs_locally() {
                if let Some(rates) = list_rates(&provider.provider) {
                    debug!(provider = %provider.provider, ?rates, "Using list price");
                    provider.cost_per_1m = rates;
                }
            }

            if !provider.is_supported() {
                warn!(
                    provider = %provider.provider,
                    "Custom provider has no base_url and cannot be called"
                );
            }
        }
        self
    }

    /// Copy with API keys masked, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for provider in &mut copy.providers {
            if !provider.api_key.is_empty() {
                provider.api_key = "[REDACTED]".to_string();
            }
        }
        copy
    }

    /// Routing engine over the configured providers
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new(self.providers.clone()).with_settings(self.routing.clone())
    }

    /// Local runtime detector honoring configured base URLs
    #[must_use]
    pub fn local_detector(&self) -> LocalDetector {
        LocalDetector::from_providers(&self.providers, self.timeouts.local_probe())
    }
}

fn expand_env(value: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    ENV_REF
        .replace_all(value, |caps: &Captures<'_>| {
            let name = &caps[1];
            lookup(name).unwrap_or_else(|| {
                warn!(variable = name, "Referenced environment variable is not set");
                String::new()
            })
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_llm::CostRates;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "ANTHROPIC_API_KEY" => Some("sk-ant-test".to_string()),
            "PROXY_HOST" => Some("proxy.internal".to_string()),
            _ => None,
        }
    }

    fn config_with(providers: Vec<ProviderConfig>) -> AppConfig {
        AppConfig {
            providers,
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_expands_env_references() {
        let config = config_with(vec![ProviderConfig::new("anthropic", "claude")
            .with_api_key("${ANTHROPIC_API_KEY}")
            .with_base_url("https://${PROXY_HOST}/v1")])
        .resolve_with(lookup);

        assert_eq!(config.providers[0].api_key, "sk-ant-test");
        assert_eq!(
            config.providers[0].base_url.as_deref(),
            Some("https://proxy.internal/v1")
        );
    }

    #[test]
    fn test_unset_variable_expands_to_empty() {
        let config = config_with(vec![
            ProviderConfig::new("openai", "gpt-5").with_api_key("${NOPE_NOT_SET}")
        ])
        .resolve_with(lookup);
        assert_eq!(config.providers[0].api_key, "");
    }

    #[test]
    fn test_literal_key_untouched() {
        let config = config_with(vec![
            ProviderConfig::new("openai", "gpt-5").with_api_key("sk-literal$")
        ])
        .resolve_with(lookup);
        assert_eq!(config.providers[0].api_key, "sk-literal$");
    }

    #[test]
    fn test_fills_list_price_only_when_unpriced() {
        let config = config_with(vec![
            ProviderConfig::new("deepseek", "deepseek-chat"),
            ProviderConfig::new("anthropic", "claude").with_cost(1.0, 2.0),
            ProviderConfig::new("ollama", "llama3.2"),
            ProviderConfig::new("my-endpoint", "m").with_base_url("http://10.0.0.2:8000"),
        ])
        .resolve_with(lookup);

        assert_eq!(
            config.providers[0].cost_per_1m,
            list_rates(&"deepseek".into()).unwrap()
        );
        assert_eq!(config.providers[1].cost_per_1m, CostRates::new(1.0, 2.0));
        assert!(config.providers[2].cost_per_1m.is_zero());
        assert!(config.providers[3].cost_per_1m.is_zero());
    }

    #[test]
    fn test_redacted_masks_keys() {
        let config = config_with(vec![
            ProviderConfig::new("openai", "gpt-5").with_api_key("sk-secret"),
            ProviderConfig::new("ollama", "llama3.2"),
        ]);
        let redacted = config.redacted();
        assert_eq!(redacted.providers[0].api_key, "[REDACTED]");
        assert_eq!(redacted.providers[1].api_key, "");
        assert_eq!(config.providers[0].api_key, "sk-secret");
    }

    #[test]
    fn test_router_uses_routing_settings() {
        let mut config = config_with(vec![ProviderConfig::new("openai", "gpt-5")]);
        config.routing.low_budget_ratio = 0.5;
        let router = config.router();
        assert_eq!(router.providers().len(), 1);
        assert!((router.settings().low_budget_ratio - 0.5).abs() < f64::EPSILON);
    }
}
