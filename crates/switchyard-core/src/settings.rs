//! Runtime settings for fallback, timeouts and the tool loop
//!
//! All fields carry serde defaults so a partial config section is valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use switchyard_llm::ProviderId;

fn default_max_retries_per_provider() -> u32 {
    1
}

fn default_detect_local() -> bool {
    true
}

fn default_retry_initial_delay_ms() -> u64 {
    250
}

fn default_retry_max_delay_ms() -> u64 {
    2_000
}

/// Fallback chain settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackSettings {
    /// Attempts per provider before advancing (total, not extra)
    #[serde(default = "default_max_retries_per_provider")]
    pub max_retries_per_provider: u32,
    /// Wholesale ordering of the cloud alternatives
    #[serde(default)]
    pub priority: Option<Vec<ProviderId>>,
    /// Alternative promoted to the front of the list
    #[serde(default)]
    pub default_fallback: Option<ProviderId>,
    /// Explicit local model names per runtime
    #[serde(default)]
    pub local_models: BTreeMap<String, Vec<String>>,
    /// Probe local runtimes when building a chain
    #[serde(default = "default_detect_local")]
    pub detect_local: bool,
    /// First backoff delay between same-provider attempts
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
    /// Backoff ceiling
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            max_retries_per_provider: default_max_retries_per_provider(),
            priority: None,
            default_fallback: None,
            local_models: BTreeMap::new(),
            detect_local: default_detect_local(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

fn default_provider_call_secs() -> u64 {
    60
}

fn default_tool_execution_secs() -> u64 {
    60
}

fn default_health_probe_secs() -> u64 {
    5
}

fn default_local_probe_secs() -> u64 {
    3
}

/// Upper bounds for every outbound call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    /// One provider call
    #[serde(default = "default_provider_call_secs")]
    pub provider_call_secs: u64,
    /// One tool execution
    #[serde(default = "default_tool_execution_secs")]
    pub tool_execution_secs: u64,
    /// One health probe
    #[serde(default = "default_health_probe_secs")]
    pub health_probe_secs: u64,
    /// One local-runtime detection probe
    #[serde(default = "default_local_probe_secs")]
    pub local_probe_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            provider_call_secs: default_provider_call_secs(),
            tool_execution_secs: default_tool_execution_secs(),
            health_probe_secs: default_health_probe_secs(),
            local_probe_secs: default_local_probe_secs(),
        }
    }
}

impl TimeoutSettings {
    /// Provider call bound
    #[must_use]
    pub fn provider_call(&self) -> Duration {
        Duration::from_secs(self.provider_call_secs)
    }

    /// Tool execution bound
    #[must_use]
    pub fn tool_execution(&self) -> Duration {
        Duration::from_secs(self.tool_execution_secs)
    }

    /// Health probe bound
    #[must_use]
    pub fn health_probe(&self) -> Duration {
        Duration::from_secs(self.health_probe_secs)
    }

    /// Local detection bound
    #[must_use]
    pub fn local_probe(&self) -> Duration {
        Duration::from_secs(self.local_probe_secs)
    }
}

fn default_max_iterations() -> u32 {
    10
}

/// Tool loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolLoopSettings {
    /// Hard ceiling on provider calls per request
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for ToolLoopSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sections_use_defaults() {
        let fallback: FallbackSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(fallback, FallbackSettings::default());
        assert_eq!(fallback.max_retries_per_provider, 1);

        let timeouts: TimeoutSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(timeouts.provider_call(), Duration::from_secs(60));
        assert_eq!(timeouts.local_probe(), Duration::from_secs(3));

        let tools: ToolLoopSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(tools.max_iterations, 10);
    }

    #[test]
    fn test_local_models_lookup() {
        let fallback: FallbackSettings = serde_json::from_value(serde_json::json!({
            "local_models": { "ollama": ["llama3.2", "qwen2.5"] },
            "priority": ["deepseek", "openai"]
        }))
        .unwrap();
        assert_eq!(fallback.local_models["ollama"], ["llama3.2", "qwen2.5"]);
        assert!(!fallback.local_models.contains_key("lmstudio"));
        assert_eq!(
            fallback.priority,
            Some(vec![ProviderId::from("deepseek"), ProviderId::from("openai")])
        );
    }
}
