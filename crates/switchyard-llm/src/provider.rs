//! Provider identity, configuration and the uniform call interface
//!
//! Provider identifiers are an open set: the well-known cloud APIs and local
//! runtimes get their own variants, anything else is a custom
//! OpenAI-compatible endpoint that must carry its own base URL.

use crate::completion::{ChatRequest, ChatResult};
use crate::cost::CostRates;
use crate::error::ProviderError;
use crate::router::TaskType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Provider identity
// ============================================================================

/// Known cloud provider APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CloudProvider {
    /// Anthropic Claude
    Anthropic,
    /// OpenAI GPT
    OpenAi,
    /// Google Gemini
    Google,
    /// Perplexity Sonar
    Perplexity,
    /// xAI Grok
    Xai,
    /// Mistral AI
    Mistral,
    /// DeepSeek
    DeepSeek,
    /// ZhipuAI GLM
    Glm,
}

impl CloudProvider {
    /// All known cloud providers
    pub const ALL: [CloudProvider; 8] = [
        Self::Anthropic,
        Self::OpenAi,
        Self::Google,
        Self::Perplexity,
        Self::Xai,
        Self::Mistral,
        Self::DeepSeek,
        Self::Glm,
    ];

    /// Canonical identifier
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Google => "google",
            Self::Perplexity => "perplexity",
            Self::Xai => "xai",
            Self::Mistral => "mistral",
            Self::DeepSeek => "deepseek",
            Self::Glm => "glm",
        }
    }
}

/// Known local model runtimes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocalRuntime {
    /// Ollama (default port 11434)
    Ollama,
    /// LM Studio (default port 1234)
    LmStudio,
}

impl LocalRuntime {
    /// Canonical identifier
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::LmStudio => "lmstudio",
        }
    }

    /// Default local base URL
    #[must_use]
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::LmStudio => "http://localhost:1234/v1",
        }
    }
}

/// Provider identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderId {
    /// Known cloud API
    Cloud(CloudProvider),
    /// Known local runtime
    Local(LocalRuntime),
    /// Custom OpenAI-compatible endpoint
    Custom(String),
}

impl ProviderId {
    /// Canonical identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cloud(p) => p.as_str(),
            Self::Local(r) => r.as_str(),
            Self::Custom(name) => name,
        }
    }

    /// Whether this is a local runtime
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Whether this provider may appear in the cloud alternatives tier
    ///
    /// Fixed allow-list: anthropic, openai, google, mistral, deepseek.
    #[must_use]
    pub fn is_cloud_fallback_candidate(&self) -> bool {
        matches!(
            self,
            Self::Cloud(
                CloudProvider::Anthropic
                    | CloudProvider::OpenAi
                    | CloudProvider::Google
                    | CloudProvider::Mistral
                    | CloudProvider::DeepSeek
            )
        )
    }
}

impl FromStr for ProviderId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let id = match normalized.as_str() {
            "anthropic" | "claude" => Self::Cloud(CloudProvider::Anthropic),
            "openai" => Self::Cloud(CloudProvider::OpenAi),
            "google" | "gemini" => Self::Cloud(CloudProvider::Google),
            "perplexity" => Self::Cloud(CloudProvider::Perplexity),
            "xai" | "grok" => Self::Cloud(CloudProvider::Xai),
            "mistral" => Self::Cloud(CloudProvider::Mistral),
            "deepseek" => Self::Cloud(CloudProvider::DeepSeek),
            "glm" | "zhipu" => Self::Cloud(CloudProvider::Glm),
            "ollama" => Self::Local(LocalRuntime::Ollama),
            "lmstudio" | "lm-studio" | "lm_studio" => Self::Local(LocalRuntime::LmStudio),
            _ => Self::Custom(s.trim().to_string()),
        };
        Ok(id)
    }
}

impl From<String> for ProviderId {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Provider configuration
// ============================================================================

fn default_true() -> bool {
    true
}

/// Transport security settings for a provider endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSecurity {
    /// Verify TLS certificates
    #[serde(default = "default_true")]
    pub verify_tls: bool,
    /// Extra CA bundle (PEM path)
    #[serde(default)]
    pub ca_bundle: Option<String>,
    /// Permit plain `http://` endpoints
    #[serde(default)]
    pub allow_insecure_http: bool,
}

impl Default for ProviderSecurity {
    fn default() -> Self {
        Self {
            verify_tls: true,
            ca_bundle: None,
            allow_insecure_http: false,
        }
    }
}

/// One configured backend
///
/// `spent_today <= daily_budget` is checked by the budget gate, never enforced
/// here; a snapshot already over budget is valid input.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider identifier
    pub provider: ProviderId,
    /// Model name
    pub model: String,
    /// API key (empty for local runtimes)
    #[serde(default)]
    pub api_key: String,
    /// Task types this provider can serve
    #[serde(default)]
    pub capabilities: BTreeSet<TaskType>,
    /// Price per million tokens
    #[serde(default)]
    pub cost_per_1m: CostRates,
    /// Daily spend ceiling in USD
    #[serde(default)]
    pub daily_budget: f64,
    /// Spend so far today in USD (read-only snapshot)
    #[serde(default)]
    pub spent_today: f64,
    /// Endpoint override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Whether this is a local runtime
    #[serde(default)]
    pub is_local: bool,
    /// Human-readable name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Transport security
    #[serde(default)]
    pub security: ProviderSecurity,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "[REDACTED]" })
            .field("capabilities", &self.capabilities)
            .field("cost_per_1m", &self.cost_per_1m)
            .field("daily_budget", &self.daily_budget)
            .field("spent_today", &self.spent_today)
            .field("base_url", &self.base_url)
            .field("is_local", &self.is_local)
            .field("display_name", &self.display_name)
            .field("security", &self.security)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a provider configuration with no capabilities and no budget
    #[must_use]
    pub fn new(provider: impl Into<ProviderId>, model: impl Into<String>) -> Self {
        let provider = provider.into();
        let is_local = provider.is_local();
        Self {
            provider,
            model: model.into(),
            api_key: String::new(),
            capabilities: BTreeSet::new(),
            cost_per_1m: CostRates::default(),
            daily_budget: 0.0,
            spent_today: 0.0,
            base_url: None,
            is_local,
            display_name: None,
            security: ProviderSecurity::default(),
        }
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the capability set
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = TaskType>) -> Self {
        self.capabilities = capabilities.into_iter().collect();
        self
    }

    /// Set per-million-token prices
    #[must_use]
    pub fn with_cost(mut self, input: f64, output: f64) -> Self {
        self.cost_per_1m = CostRates { input, output };
        self
    }

    /// Set the daily budget and today's spend
    #[must_use]
    pub fn with_budget(mut self, daily_budget: f64, spent_today: f64) -> Self {
        self.daily_budget = daily_budget;
        self.spent_today = spent_today;
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the security settings
    #[must_use]
    pub fn with_security(mut self, security: ProviderSecurity) -> Self {
        self.security = security;
        self
    }

    /// Display name, falling back to the identifier
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.provider.as_str())
    }

    /// Whether this backend is a local runtime, by flag or by identifier
    #[must_use]
    pub fn runs_locally(&self) -> bool {
        self.is_local || self.provider.is_local()
    }

    /// Whether some adapter can serve this provider
    ///
    /// Custom providers are only callable through their own base URL.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        match self.provider {
            ProviderId::Custom(_) => self.base_url.is_some(),
            _ => true,
        }
    }

    /// Remaining budget in USD (never negative)
    #[must_use]
    pub fn remaining_budget(&self) -> f64 {
        (self.daily_budget - self.spent_today).max(0.0)
    }
}

// ============================================================================
// Provider call interface
// ============================================================================

/// Uniform call interface implemented by the per-provider wire adapters
#[async_trait::async_trait]
pub trait ProviderClient: Send + Sync {
    /// Send one chat turn to the given provider
    async fn chat(
        &self,
        provider: &ProviderConfig,
        request: &ChatRequest,
    ) -> std::result::Result<ChatResult, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_parsing() {
        assert_eq!(
            ProviderId::from("anthropic"),
            ProviderId::Cloud(CloudProvider::Anthropic)
        );
        assert_eq!(
            ProviderId::from("Gemini"),
            ProviderId::Cloud(CloudProvider::Google)
        );
        assert_eq!(
            ProviderId::from("lm-studio"),
            ProviderId::Local(LocalRuntime::LmStudio)
        );
        assert_eq!(
            ProviderId::from("together"),
            ProviderId::Custom("together".to_string())
        );
    }

    #[test]
    fn test_provider_id_serde_is_plain_string() {
        let json = serde_json::to_string(&ProviderId::Cloud(CloudProvider::OpenAi)).unwrap();
        assert_eq!(json, "\"openai\"");

        let id: ProviderId = serde_json::from_str("\"ollama\"").unwrap();
        assert!(id.is_local());

        let custom: ProviderId = serde_json::from_str("\"my-vllm\"").unwrap();
        assert_eq!(custom.to_string(), "my-vllm");
    }

    #[test]
    fn test_cloud_fallback_allow_list() {
        let allowed: Vec<_> = CloudProvider::ALL
            .iter()
            .map(|p| ProviderId::Cloud(*p))
            .filter(ProviderId::is_cloud_fallback_candidate)
            .map(|p| p.to_string())
            .collect();
        assert_eq!(
            allowed,
            vec!["anthropic", "openai", "google", "mistral", "deepseek"]
        );
        assert!(!ProviderId::Local(LocalRuntime::Ollama).is_cloud_fallback_candidate());
        assert!(!ProviderId::from("custom").is_cloud_fallback_candidate());
    }

    #[test]
    fn test_custom_provider_requires_base_url() {
        let config = ProviderConfig::new("my-vllm", "llama");
        assert!(!config.is_supported());
        assert!(config.with_base_url("http://gpu-box:8000/v1").is_supported());
        assert!(ProviderConfig::new("openai", "gpt-5").is_supported());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig::new("openai", "gpt-5").with_api_key("sk-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_provider_config_deserializes_with_defaults() {
        let config: ProviderConfig = serde_json::from_value(serde_json::json!({
            "provider": "ollama",
            "model": "llama3.2"
        }))
        .unwrap();
        assert!(config.security.verify_tls);
        assert!(config.capabilities.is_empty());
        assert_eq!(config.remaining_budget(), 0.0);
    }

    #[test]
    fn test_remaining_budget_tolerates_overspend() {
        let config = ProviderConfig::new("openai", "gpt-5").with_budget(10.0, 12.5);
        assert_eq!(config.remaining_budget(), 0.0);
    }
}
