//! Health prober
//!
//! Best-effort reachability check. A probe never returns an error: every
//! failure is folded into an unhealthy [`HealthStatus`].

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use switchyard_llm::{CloudProvider, LocalRuntime, ProviderId};
use tracing::debug;

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Endpoint reachable
    pub healthy: bool,
    /// Wall time of the probe, both requests included
    pub latency_ms: u64,
    /// Last HTTP status seen
    pub status: Option<u16>,
    /// Why the probe failed
    pub error: Option<String>,
    /// When the probe finished
    pub checked_at: DateTime<Utc>,
}

/// Well-known probe URL for a provider
#[must_use]
pub fn probe_url(provider: &ProviderId) -> Option<String> {
    let url = match provider {
        ProviderId::Cloud(cloud) => match cloud {
            CloudProvider::Anthropic => "https://api.anthropic.com/v1/models",
            CloudProvider::OpenAi => "https://api.openai.com/v1/models",
            CloudProvider::Google => "https://generativelanguage.googleapis.com/v1beta/models",
            CloudProvider::Perplexity => "https://api.perplexity.ai",
            CloudProvider::Xai => "https://api.x.ai/v1/models",
            CloudProvider::Mistral => "https://api.mistral.ai/v1/models",
            CloudProvider::DeepSeek => "https://api.deepseek.com/models",
            CloudProvider::Glm => "https://open.bigmodel.cn/api/paas/v4",
        }
        .to_string(),
        ProviderId::Local(LocalRuntime::Ollama) => {
            format!("{}/api/tags", LocalRuntime::Ollama.default_base_url())
        }
        ProviderId::Local(LocalRuntime::LmStudio) => {
            format!("{}/models", LocalRuntime::LmStudio.default_base_url())
        }
        ProviderId::Custom(_) => return None,
    };
    Some(url)
}

// 401/403 mean the endpoint answered; credentials are a separate problem.
fn counts_as_healthy(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Reachability prober with a shared HTTP client
#[derive(Debug, Clone)]
pub struct HealthProber {
    client: Client,
    timeout: Duration,
}

impl HealthProber {
    /// Create a prober bounding each request by `timeout`
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Probe a provider, or `base_url` when given
    ///
    /// Sends `HEAD`, then `GET` if the `HEAD` did not come back healthy.
    pub async fn check(&self, provider: &ProviderId, base_url: Option<&str>) -> HealthStatus {
        let started = Instant::now();

        let Some(url) = base_url.map(str::to_string).or_else(|| probe_url(provider)) else {
            return HealthStatus {
                healthy: false,
                latency_ms: 0,
                status: None,
                error: Some(format!("no probe URL known for {provider}")),
                checked_at: Utc::now(),
            };
        };

        let mut outcome = self.probe(Method::HEAD, &url).await;
        if !matches!(outcome, Ok(status) if counts_as_healthy(status)) {
            debug!(provider = %provider, url = %url, "HEAD probe not healthy, retrying with GET");
            outcome = self.probe(Method::GET, &url).await;
        }

        let latency_ms = started.elapsed().as_millis() as u64;
        let status = match outcome {
            Ok(status) => HealthStatus {
                healthy: counts_as_healthy(status),
                latency_ms,
                status: Some(status.as_u16()),
                error: (!counts_as_healthy(status)).then(|| format!("HTTP {status}")),
                checked_at: Utc::now(),
            },
            Err(e) => HealthStatus {
                healthy: false,
                latency_ms,
                status: None,
                error: Some(e),
                checked_at: Utc::now(),
            },
        };

        debug!(
            provider = %provider,
            healthy = status.healthy,
            latency_ms,
            "Health probe finished"
        );
        status
    }

    async fn probe(&self, method: Method, url: &str) -> Result<StatusCode, String> {
        match self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status()),
            Err(e) if e.is_timeout() => Err(format!("timeout after {}ms", self.timeout.as_millis())),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// One-shot probe
pub async fn check_provider_health(
    provider: &ProviderId,
    base_url: Option<&str>,
    timeout: Duration,
) -> HealthStatus {
    HealthProber::new(timeout).check(provider, base_url).await
}
