//! Fallback chain builder

use crate::error::{Error, Result};
use crate::local::LocalProviders;
use crate::settings::FallbackSettings;
use switchyard_llm::{
    ChatRequest, LocalRuntime, Message, ProviderConfig, ProviderId, ProviderSecurity,
    RoutingDecision, ToolChoice, ToolDefinition,
};
use tracing::{debug, warn};

/// Ordered candidates for one request
///
/// Built fresh per request. The flat attempt order is `primary`, then
/// `alternatives`, then `local_fallbacks`.
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    /// Routed provider
    pub primary: ProviderConfig,
    /// Cloud alternatives, in attempt order
    pub alternatives: Vec<ProviderConfig>,
    /// Local runtimes, tried last
    pub local_fallbacks: Vec<ProviderConfig>,
    /// Attempts per provider
    pub max_retries_per_provider: u32,
    /// Tools offered on every attempt
    pub tools: Vec<ToolDefinition>,
    /// Tool choice sent on every attempt
    pub tool_choice: ToolChoice,
}

impl FallbackConfig {
    /// Chain with a single provider
    #[must_use]
    pub fn new(primary: ProviderConfig) -> Self {
        Self {
            primary,
            alternatives: Vec::new(),
            local_fallbacks: Vec::new(),
            max_retries_per_provider: 1,
            tools: Vec::new(),
            tool_choice: ToolChoice::default(),
        }
    }

    /// Set the tools threaded through every attempt
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>, tool_choice: ToolChoice) -> Self {
        self.tools = tools;
        self.tool_choice = tool_choice;
        self
    }

    /// Set attempts per provider
    #[must_use]
    pub fn with_max_retries(mut self, max_retries_per_provider: u32) -> Self {
        self.max_retries_per_provider = max_retries_per_provider;
        self
    }

    /// Flat attempt order
    #[must_use]
    pub fn chain(&self) -> Vec<&ProviderConfig> {
        std::iter::once(&self.primary)
            .chain(&self.alternatives)
            .chain(&self.local_fallbacks)
            .collect()
    }

    /// Find a chain member by provider and model
    #[must_use]
    pub fn find(&self, provider: &ProviderId, model: &str) -> Option<&ProviderConfig> {
        self.chain()
            .into_iter()
            .find(|p| &p.provider == provider && p.model == model)
    }

    /// Chat request carrying this chain's tools
    #[must_use]
    pub fn request(&self, system_prompt: &str, messages: &[Message]) -> ChatRequest {
        ChatRequest::new(system_prompt, messages.to_vec())
            .with_tools(self.tools.clone())
            .with_tool_choice(self.tool_choice.clone())
    }
}

/// A local model to append to the local tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalModel {
    /// Runtime serving the model
    pub runtime: LocalRuntime,
    /// Model name as the runtime reports it
    pub model: String,
}

/// Caller overrides for chain building
#[derive(Debug, Clone)]
pub struct ChainOptions {
    /// Replaces the alternative ordering wholesale
    pub priority: Option<Vec<ProviderId>>,
    /// Promoted to the front of the alternatives
    pub default_fallback: Option<ProviderId>,
    /// Explicitly configured or detected local models, in order
    pub local_models: Vec<LocalModel>,
    /// Attempts per provider
    pub max_retries_per_provider: u32,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            priority: None,
            default_fallback: None,
            local_models: Vec::new(),
            max_retries_per_provider: 1,
        }
    }
}

impl ChainOptions {
    /// Options from configuration
    #[must_use]
    pub fn from_settings(settings: &FallbackSettings) -> Self {
        let mut local_models = Vec::new();
        for (runtime, models) in &settings.local_models {
            match ProviderId::from(runtime.as_str()) {
                ProviderId::Local(runtime) => local_models.extend(
                    models
                        .iter()
                        .map(|model| LocalModel { runtime, model: model.clone() }),
                ),
                other => warn!(runtime = %other, "Ignoring local models for a non-local runtime"),
            }
        }

        Self {
            priority: settings.priority.clone(),
            default_fallback: settings.default_fallback.clone(),
            local_models,
            max_retries_per_provider: settings.max_retries_per_provider,
        }
    }

    /// Add a local model
    #[must_use]
    pub fn with_local_model(mut self, runtime: LocalRuntime, model: impl Into<String>) -> Self {
        self.local_models.push(LocalModel {
            runtime,
            model: model.into(),
        });
        self
    }

    /// Add detected runtimes
    ///
    /// A runtime with explicitly configured models keeps only those;
    /// otherwise its first detected model is used.
    #[must_use]
    pub fn with_detected(mut self, detected: &LocalProviders) -> Self {
        for runtime in [LocalRuntime::Ollama, LocalRuntime::LmStudio] {
            if self.local_models.iter().any(|m| m.runtime == runtime) {
                continue;
            }
            let status = detected.get(runtime);
            if let Some(model) = status.models.first().filter(|_| status.available) {
                debug!(runtime = runtime.as_str(), model = %model, "Adding detected local model");
                self.local_models.push(LocalModel {
                    runtime,
                    model: model.clone(),
                });
            }
        }
        self
    }
}

fn local_config(
    local: &LocalModel,
    providers: &[ProviderConfig],
    security: &ProviderSecurity,
) -> ProviderConfig {
    let id = ProviderId::Local(local.runtime);
    let base_url = providers
        .iter()
        .find(|p| p.provider == id)
        .and_then(|p| p.base_url.clone())
        .unwrap_or_else(|| local.runtime.default_base_url().to_string());

    let mut config = ProviderConfig::new(id, local.model.clone())
        .with_base_url(base_url)
        .with_security(security.clone());
    config.is_local = true;
    config
}

fn local_tier(
    options: &ChainOptions,
    providers: &[ProviderConfig],
    security: &ProviderSecurity,
    exclude: Option<&ProviderConfig>,
) -> Vec<ProviderConfig> {
    let mut tier: Vec<ProviderConfig> = Vec::new();
    for local in &options.local_models {
        let config = local_config(local, providers, security);
        let duplicate = tier
            .iter()
            .chain(exclude)
            .any(|p| p.provider == config.provider && p.model == config.model);
        if !duplicate {
            tier.push(config);
        }
    }
    tier
}

/// Build the chain for a primary provider
///
/// The first configuration of `primary` becomes the primary. Alternatives
/// default to every other configured cloud provider on the fallback
/// allow-list, in configuration order. Local runtimes only enter via
/// `options.local_models` and inherit the primary's security settings.
///
/// # Errors
///
/// - [`Error::Llm`] (`NotConfigured`) if `primary` is not in `providers`
/// - [`Error::UnsupportedProvider`] if the primary has no adapter
pub fn build_fallback_chain(
    providers: &[ProviderConfig],
    primary: &ProviderId,
    options: &ChainOptions,
) -> Result<FallbackConfig> {
    build_chain(providers, primary, None, options)
}

/// Build the chain behind a routing decision
///
/// The primary is the exact provider and model the router chose, so other
/// models of the same provider stay eligible as alternatives.
///
/// # Errors
///
/// Same as [`build_fallback_chain`].
pub fn build_routed_chain(
    providers: &[ProviderConfig],
    decision: &RoutingDecision,
    options: &ChainOptions,
) -> Result<FallbackConfig> {
    build_chain(providers, decision.provider(), Some(decision.model()), options)
}

fn same_backend(a: &ProviderConfig, b: &ProviderConfig) -> bool {
    a.provider == b.provider && a.model == b.model
}

fn build_chain(
    providers: &[ProviderConfig],
    primary: &ProviderId,
    model: Option<&str>,
    options: &ChainOptions,
) -> Result<FallbackConfig> {
    let primary_config = providers
        .iter()
        .find(|p| &p.provider == primary && model.is_none_or(|m| p.model == m))
        .ok_or_else(|| {
            let name = match model {
                Some(m) => format!("{primary}/{m}"),
                None => primary.to_string(),
            };
            switchyard_llm::Error::NotConfigured(name)
        })?;

    if !primary_config.is_supported() {
        return Err(Error::UnsupportedProvider(primary.to_string()));
    }

    let candidates: Vec<&ProviderConfig> = match &options.priority {
        Some(priority) => priority
            .iter()
            .filter_map(|id| {
                let found = providers.iter().find(|p| {
                    &p.provider == id
                        && !same_backend(p, primary_config)
                        && !p.runs_locally()
                        && p.is_supported()
                });
                if found.is_none() && id != primary {
                    warn!(provider = %id, "Priority entry is not a configured cloud provider");
                }
                found
            })
            .collect(),
        None => providers
            .iter()
            .filter(|p| {
                !same_backend(p, primary_config) && p.provider.is_cloud_fallback_candidate()
            })
            .collect(),
    };

    let mut alternatives: Vec<ProviderConfig> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !alternatives.iter().any(|p| same_backend(p, candidate)) {
            alternatives.push(candidate.clone());
        }
    }

    if let Some(preferred) = options.default_fallback.as_ref().filter(|id| *id != primary) {
        if let Some(pos) = alternatives.iter().position(|p| &p.provider == preferred) {
            let promoted = alternatives.remove(pos);
            alternatives.insert(0, promoted);
        } else if let Some(config) = providers
            .iter()
            .find(|p| &p.provider == preferred && !p.runs_locally() && p.is_supported())
        {
            alternatives.insert(0, config.clone());
        } else {
            warn!(provider = %preferred, "Default fallback is not configured");
        }
    }

    let local_fallbacks = local_tier(
        options,
        providers,
        &primary_config.security,
        Some(primary_config),
    );

    debug!(
        primary = %primary,
        alternatives = alternatives.len(),
        local = local_fallbacks.len(),
        "Built fallback chain"
    );

    Ok(FallbackConfig {
        primary: primary_config.clone(),
        alternatives,
        local_fallbacks,
        max_retries_per_provider: options.max_retries_per_provider.max(1),
        tools: Vec::new(),
        tool_choice: ToolChoice::default(),
    })
}

/// Local-only chain for when every cloud provider is over budget
///
/// Configured local providers come first, then `options.local_models`.
/// Returns `None` when no local runtime is known.
#[must_use]
pub fn build_local_chain(
    providers: &[ProviderConfig],
    options: &ChainOptions,
) -> Option<FallbackConfig> {
    let configured: Vec<ProviderConfig> = providers
        .iter()
        .filter(|p| p.runs_locally())
        .cloned()
        .collect();

    let security = configured
        .first()
        .map(|p| p.security.clone())
        .unwrap_or_default();

    let mut tier = configured;
    for extra in local_tier(options, providers, &security, None) {
        if !tier
            .iter()
            .any(|p| p.provider == extra.provider && p.model == extra.model)
        {
            tier.push(extra);
        }
    }

    let mut tier = tier.into_iter();
    let primary = tier.next()?;
    Some(FallbackConfig {
        primary,
        alternatives: Vec::new(),
        local_fallbacks: tier.collect(),
        max_retries_per_provider: options.max_retries_per_provider.max(1),
        tools: Vec::new(),
        tool_choice: ToolChoice::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::RuntimeStatus;
    use switchyard_llm::{Router, RoutingOptions, TaskType};

    fn cloud(name: &str) -> ProviderConfig {
        ProviderConfig::new(name, format!("{name}-model")).with_budget(10.0, 0.0)
    }

    fn ids(configs: &[ProviderConfig]) -> Vec<String> {
        configs.iter().map(|p| p.provider.to_string()).collect()
    }

    #[test]
    fn test_basic_chain() {
        let providers = vec![cloud("anthropic"), cloud("openai"), cloud("google")];
        let chain =
            build_fallback_chain(&providers, &"anthropic".into(), &ChainOptions::default())
                .unwrap();

        assert_eq!(chain.primary.provider.as_str(), "anthropic");
        assert_eq!(ids(&chain.alternatives), vec!["openai", "google"]);
        assert!(chain.local_fallbacks.is_empty());
        assert_eq!(chain.chain().len(), 3);
    }

    #[test]
    fn test_alternatives_restricted_to_allow_list() {
        let providers = vec![
            cloud("openai"),
            cloud("xai"),
            cloud("perplexity"),
            cloud("deepseek"),
            ProviderConfig::new("ollama", "llama3.2"),
            cloud("my-gateway").with_base_url("https://gw.example.com"),
        ];
        let chain =
            build_fallback_chain(&providers, &"openai".into(), &ChainOptions::default()).unwrap();
        assert_eq!(ids(&chain.alternatives), vec!["deepseek"]);
        assert!(chain.local_fallbacks.is_empty());
    }

    #[test]
    fn test_missing_primary_fails() {
        let providers = vec![cloud("openai")];
        let err = build_fallback_chain(&providers, &"anthropic".into(), &ChainOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Llm(switchyard_llm::Error::NotConfigured(_))
        ));
    }

    #[test]
    fn test_unsupported_primary_fails() {
        let providers = vec![cloud("my-gateway")];
        let err = build_fallback_chain(&providers, &"my-gateway".into(), &ChainOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedProvider(_)));
    }

    #[test]
    fn test_priority_replaces_order_wholesale() {
        let providers = vec![cloud("anthropic"), cloud("openai"), cloud("google"), cloud("mistral")];
        let options = ChainOptions {
            priority: Some(vec!["mistral".into(), "anthropic".into(), "nowhere".into()]),
            ..ChainOptions::default()
        }
        .with_local_model(LocalRuntime::Ollama, "llama3.2");

        let chain = build_fallback_chain(&providers, &"anthropic".into(), &options).unwrap();
        assert_eq!(ids(&chain.alternatives), vec!["mistral"]);
        assert_eq!(ids(&chain.local_fallbacks), vec!["ollama"]);
    }

    #[test]
    fn test_priority_repeats_collapse() {
        let providers = vec![cloud("anthropic"), cloud("openai"), cloud("google")];
        let options = ChainOptions {
            priority: Some(vec!["openai".into(), "google".into(), "openai".into()]),
            ..ChainOptions::default()
        };
        let chain = build_fallback_chain(&providers, &"anthropic".into(), &options).unwrap();
        assert_eq!(ids(&chain.alternatives), vec!["openai", "google"]);
    }

    #[test]
    fn test_routed_chain_keeps_chosen_model() {
        let providers = vec![
            ProviderConfig::new("openai", "gpt-reasoner")
                .with_capabilities([TaskType::DeepReasoning])
                .with_budget(10.0, 0.0),
            ProviderConfig::new("openai", "gpt-coder")
                .with_capabilities([TaskType::CodeGeneration])
                .with_budget(10.0, 0.0),
            cloud("anthropic"),
        ];
        let decision = Router::new(providers.clone())
            .route("fix this function", &RoutingOptions::default())
            .unwrap();
        assert_eq!(decision.model(), "gpt-coder");

        let chain = build_routed_chain(&providers, &decision, &ChainOptions::default()).unwrap();
        assert_eq!(chain.primary.model, "gpt-coder");
        let alternatives: Vec<&str> = chain.alternatives.iter().map(|p| p.model.as_str()).collect();
        assert_eq!(alternatives, vec!["gpt-reasoner", "anthropic-model"]);
    }

    #[test]
    fn test_default_fallback_promoted() {
        let providers = vec![cloud("anthropic"), cloud("openai"), cloud("google"), cloud("deepseek")];
        let options = ChainOptions {
            default_fallback: Some("deepseek".into()),
            ..ChainOptions::default()
        };
        let chain = build_fallback_chain(&providers, &"anthropic".into(), &options).unwrap();
        assert_eq!(ids(&chain.alternatives), vec!["deepseek", "openai", "google"]);
    }

    #[test]
    fn test_local_tier_inherits_primary_security() {
        let strict = ProviderSecurity {
            verify_tls: true,
            ca_bundle: Some("/etc/ssl/corp.pem".into()),
            allow_insecure_http: false,
        };
        let providers = vec![
            cloud("anthropic").with_security(strict.clone()),
            ProviderConfig::new("ollama", "ignored").with_base_url("http://gpu-box:11434"),
        ];
        let options = ChainOptions::default()
            .with_local_model(LocalRuntime::Ollama, "llama3.2")
            .with_local_model(LocalRuntime::Ollama, "llama3.2")
            .with_local_model(LocalRuntime::LmStudio, "phi-3");

        let chain = build_fallback_chain(&providers, &"anthropic".into(), &options).unwrap();
        assert_eq!(chain.local_fallbacks.len(), 2);
        for local in &chain.local_fallbacks {
            assert_eq!(local.security, strict);
            assert!(local.is_local);
        }
        assert_eq!(
            chain.local_fallbacks[0].base_url.as_deref(),
            Some("http://gpu-box:11434")
        );
        assert_eq!(
            chain.local_fallbacks[1].base_url.as_deref(),
            Some("http://localhost:1234/v1")
        );
        // locals never leak into the cloud tier
        assert_eq!(ids(&chain.alternatives), Vec::<String>::new());
    }

    #[test]
    fn test_detected_models_respect_configured_ones() {
        let detected = LocalProviders {
            ollama: RuntimeStatus {
                available: true,
                models: vec!["qwen2.5".into(), "llama3.2".into()],
            },
            lmstudio: RuntimeStatus {
                available: true,
                models: vec!["phi-3".into()],
            },
        };
        let options = ChainOptions::default()
            .with_local_model(LocalRuntime::LmStudio, "mistral-7b")
            .with_detected(&detected);

        let models: Vec<_> = options.local_models.iter().map(|m| m.model.as_str()).collect();
        assert_eq!(models, vec!["mistral-7b", "qwen2.5"]);
    }

    #[test]
    fn test_options_from_settings() {
        let settings: FallbackSettings = serde_json::from_value(serde_json::json!({
            "max_retries_per_provider": 3,
            "default_fallback": "openai",
            "local_models": { "ollama": ["llama3.2"], "openai": ["gpt"] }
        }))
        .unwrap();
        let options = ChainOptions::from_settings(&settings);
        assert_eq!(options.max_retries_per_provider, 3);
        assert_eq!(options.default_fallback, Some("openai".into()));
        assert_eq!(
            options.local_models,
            vec![LocalModel {
                runtime: LocalRuntime::Ollama,
                model: "llama3.2".into()
            }]
        );
    }

    #[test]
    fn test_local_only_chain() {
        let providers = vec![
            cloud("anthropic").with_budget(10.0, 10.0),
            ProviderConfig::new("lmstudio", "phi-3"),
        ];
        let options = ChainOptions::default().with_local_model(LocalRuntime::Ollama, "llama3.2");
        let chain = build_local_chain(&providers, &options).unwrap();
        assert_eq!(chain.primary.provider.as_str(), "lmstudio");
        assert!(chain.alternatives.is_empty());
        assert_eq!(ids(&chain.local_fallbacks), vec!["ollama"]);

        assert!(build_local_chain(&[cloud("openai")], &ChainOptions::default()).is_none());
    }
}
