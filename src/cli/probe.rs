//! Reachability commands

use super::Output;
use crate::config::AppConfig;
use anyhow::Result;
use switchyard_core::{HealthProber, HealthStatus, LocalProviders, RuntimeStatus};
use switchyard_llm::{LocalRuntime, ProviderId};

/// `switchyard detect`
pub async fn detect(out: Output, config: &AppConfig) -> Result<()> {
    let detected = config.local_detector().detect().await;
    out.emit(&detected, || render_detected(&detected))
}

fn render_detected(detected: &LocalProviders) -> String {
    [LocalRuntime::Ollama, LocalRuntime::LmStudio]
        .into_iter()
        .map(|runtime| render_runtime(runtime, detected.get(runtime)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_runtime(runtime: LocalRuntime, status: &RuntimeStatus) -> String {
    if !status.available {
        return format!("{:<9} unavailable", runtime.as_str());
    }
    if status.models.is_empty() {
        return format!("{:<9} running, no models", runtime.as_str());
    }
    format!("{:<9} {}", runtime.as_str(), status.models.join(", "))
}

/// `switchyard health`
pub async fn health(
    out: Output,
    config: &AppConfig,
    provider: &str,
    base_url: Option<&str>,
) -> Result<()> {
    let provider = ProviderId::from(provider);
    let status = HealthProber::new(config.timeouts.health_probe())
        .check(&provider, base_url)
        .await;
    out.emit(&status, || render_health(&provider, &status))
}

fn render_health(provider: &ProviderId, status: &HealthStatus) -> String {
    let state = if status.healthy { "healthy" } else { "unhealthy" };
    let mut line = format!("{provider}: {state} ({} ms)", status.latency_ms);
    if let Some(code) = status.status {
        line.push_str(&format!(" HTTP {code}"));
    }
    if let Some(error) = &status.error {
        line.push_str(&format!(" - {error}"));
    }
    line
}
