//! Routing rules and tunable data
//!
//! The quality ranking and the image-generation allow-list are configuration
//! data consumed by the routing engine, so they can be tuned from config
//! without touching the algorithm.

use super::types::RoutingStrategy;
use crate::provider::{CloudProvider, ProviderId};
use serde::{Deserialize, Serialize};

/// Rank given to providers missing from the quality ranking
pub const UNRANKED: usize = 99;

/// Ordered provider list, best quality first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityRanking(Vec<ProviderId>);

impl Default for QualityRanking {
    fn default() -> Self {
        Self(
            [
                "anthropic",
                "openai",
                "google",
                "perplexity",
                "xai",
                "mistral",
                "deepseek",
                "glm",
                "ollama",
                "lmstudio",
            ]
            .into_iter()
            .map(ProviderId::from)
            .collect(),
        )
    }
}

impl QualityRanking {
    /// Create a ranking from an ordered list
    #[must_use]
    pub fn new(ranked: Vec<ProviderId>) -> Self {
        Self(ranked)
    }

    /// Rank of a provider (lower is better)
    #[must_use]
    pub fn rank(&self, provider: &ProviderId) -> usize {
        self.0
            .iter()
            .position(|p| p == provider)
            .unwrap_or(UNRANKED)
    }

    /// Ranked providers
    #[must_use]
    pub fn providers(&self) -> &[ProviderId] {
        &self.0
    }
}

fn default_image_generation_providers() -> Vec<ProviderId> {
    vec![
        ProviderId::Cloud(CloudProvider::OpenAi),
        ProviderId::Cloud(CloudProvider::Google),
        ProviderId::Cloud(CloudProvider::Xai),
    ]
}

fn default_low_budget_ratio() -> f64 {
    0.2
}

/// Routing engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Strategy applied when a request names none
    #[serde(default)]
    pub default_strategy: Option<RoutingStrategy>,
    /// Quality ranking used by the quality sort
    #[serde(default)]
    pub quality_ranking: QualityRanking,
    /// Providers accepted for image generation even without the capability tag
    #[serde(default = "default_image_generation_providers")]
    pub image_generation_providers: Vec<ProviderId>,
    /// Remaining-budget fraction below which a warning is added to the reasoning
    #[serde(default = "default_low_budget_ratio")]
    pub low_budget_ratio: f64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            default_strategy: None,
            quality_ranking: QualityRanking::default(),
            image_generation_providers: default_image_generation_providers(),
            low_budget_ratio: default_low_budget_ratio(),
        }
    }
}

/// Quality remark for well-known providers
#[must_use]
pub fn quality_note(provider: &ProviderId) -> Option<&'static str> {
    let note = match provider {
        ProviderId::Cloud(CloudProvider::Anthropic) => {
            "Claude offers strong reasoning and careful code output"
        }
        ProviderId::Cloud(CloudProvider::OpenAi) => "GPT is a reliable all-rounder with broad tool support",
        ProviderId::Cloud(CloudProvider::Google) => "Gemini handles long context and multimodal input well",
        ProviderId::Cloud(CloudProvider::Perplexity) => "Perplexity grounds answers in live search",
        ProviderId::Cloud(CloudProvider::Xai) => "Grok is fast with up-to-date knowledge",
        ProviderId::Cloud(CloudProvider::Mistral) => "Mistral is efficient for everyday tasks",
        ProviderId::Cloud(CloudProvider::DeepSeek) => "DeepSeek is very low cost with solid coding ability",
        ProviderId::Cloud(CloudProvider::Glm) => "GLM is a low-cost multilingual option",
        ProviderId::Local(_) => "Local model: no API cost, data stays on this machine",
        ProviderId::Custom(_) => return None,
    };
    Some(note)
}
