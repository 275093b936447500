//! List prices
//!
//! Rough per-provider list prices (USD per 1M tokens) for the flagship chat
//! model of each known cloud provider. Used to fill in provider configs that
//! omit `cost_per_1m`; explicit configuration always wins.

use super::CostRates;
use crate::provider::{CloudProvider, ProviderId};

/// Anthropic Claude Sonnet 4.5
pub const ANTHROPIC_RATES: CostRates = CostRates::new(3.00, 15.00);
/// OpenAI GPT-5
pub const OPENAI_RATES: CostRates = CostRates::new(1.25, 10.00);
/// Google Gemini 2.5 Pro
pub const GOOGLE_RATES: CostRates = CostRates::new(1.25, 10.00);
/// Perplexity Sonar Pro
pub const PERPLEXITY_RATES: CostRates = CostRates::new(3.00, 15.00);
/// xAI Grok 4
pub const XAI_RATES: CostRates = CostRates::new(3.00, 15.00);
/// Mistral Large
pub const MISTRAL_RATES: CostRates = CostRates::new(2.00, 6.00);
/// DeepSeek Chat (V3)
pub const DEEPSEEK_RATES: CostRates = CostRates::new(0.27, 1.10);
/// ZhipuAI GLM-4.6
pub const GLM_RATES: CostRates = CostRates::new(0.60, 2.20);

/// List price for a provider, if one is known
///
/// Local runtimes are free; custom endpoints have no list price.
#[must_use]
pub fn list_rates(provider: &ProviderId) -> Option<CostRates> {
    match provider {
        ProviderId::Cloud(cloud) => Some(match cloud {
            CloudProvider::Anthropic => ANTHROPIC_RATES,
            CloudProvider::OpenAi => OPENAI_RATES,
            CloudProvider::Google => GOOGLE_RATES,
            CloudProvider::Perplexity => PERPLEXITY_RATES,
            CloudProvider::Xai => XAI_RATES,
            CloudProvider::Mistral => MISTRAL_RATES,
            CloudProvider::DeepSeek => DEEPSEEK_RATES,
            CloudProvider::Glm => GLM_RATES,
        }),
        ProviderId::Local(_) => Some(CostRates::default()),
        ProviderId::Custom(_) => None,
    }
}
