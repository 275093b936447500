//! Routing inspection commands

use super::Output;
use crate::config::AppConfig;
use anyhow::{Context, Result};
use serde_json::json;
use switchyard_core::{build_fallback_chain, ChainOptions, FallbackConfig};
use switchyard_llm::{
    classify as classify_prompt, ProviderId, RoutingDecision, RoutingOptions, RoutingStrategy,
    TaskType,
};

/// `switchyard classify`
pub fn classify(out: Output, prompt: &str) -> Result<()> {
    let task = classify_prompt(prompt);
    out.emit(&json!({ "task_type": task }), || task.to_string())
}

/// `switchyard route`
pub fn route(
    out: Output,
    config: &AppConfig,
    prompt: &str,
    task: Option<&str>,
    provider: Option<&str>,
    strategy: Option<&str>,
) -> Result<()> {
    let options = routing_options(task, provider, strategy)?;
    let decision = config
        .router()
        .route(prompt, &options)
        .context("Routing failed")?;

    out.emit(&decision, || render_decision(&decision))
}

fn routing_options(
    task: Option<&str>,
    provider: Option<&str>,
    strategy: Option<&str>,
) -> Result<RoutingOptions> {
    let mut options = RoutingOptions::default();
    if let Some(task) = task {
        options = options.with_task_type(task.parse::<TaskType>()?);
    }
    if let Some(provider) = provider {
        options = options.with_override(provider);
    }
    if let Some(strategy) = strategy {
        options = options.with_strategy(strategy.parse::<RoutingStrategy>()?);
    }
    Ok(options)
}

fn render_decision(decision: &RoutingDecision) -> String {
    let mut lines = vec![
        format!("provider:  {} ({})", decision.provider(), decision.model()),
        format!("task:      {}", decision.task_type()),
        format!("est. cost: ${:.6}", decision.estimated_cost()),
        format!("reasoning: {}", decision.reasoning()),
    ];
    for alt in decision.alternatives() {
        lines.push(format!("  alt:     {} ${:.6}", alt.provider, alt.estimated_cost));
    }
    lines.join("\n")
}

/// `switchyard chain`
pub async fn chain(out: Output, config: &AppConfig, primary: &str, detect: bool) -> Result<()> {
    let mut options = ChainOptions::from_settings(&config.fallback);
    if detect {
        let detected = config.local_detector().detect().await;
        options = options.with_detected(&detected);
    }

    let chain = build_fallback_chain(&config.providers, &ProviderId::from(primary), &options)
        .context("Could not build fallback chain")?;

    out.emit(&chain_json(&chain), || render_chain(&chain))
}

fn chain_json(chain: &FallbackConfig) -> serde_json::Value {
    let entry = |p: &switchyard_llm::ProviderConfig| {
        json!({ "provider": p.provider, "model": p.model, "local": p.runs_locally() })
    };
    json!({
        "primary": entry(&chain.primary),
        "alternatives": chain.alternatives.iter().map(entry).collect::<Vec<_>>(),
        "local_fallbacks": chain.local_fallbacks.iter().map(entry).collect::<Vec<_>>(),
        "max_retries_per_provider": chain.max_retries_per_provider,
    })
}

fn render_chain(chain: &FallbackConfig) -> String {
    chain
        .chain()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let tier = if i == 0 {
                "primary"
            } else if p.runs_locally() {
                "local"
            } else {
                "cloud"
            };
            format!("{}. {} ({}) [{tier}]", i + 1, p.provider, p.model)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
