//! Local-provider detector
//!
//! Probes Ollama and LM Studio concurrently. A runtime that does not answer
//! is reported as unavailable; detection itself never fails.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use switchyard_llm::{LocalRuntime, ProviderConfig, ProviderId};
use tracing::debug;

/// Availability of one local runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeStatus {
    /// Runtime answered the probe
    pub available: bool,
    /// Models it currently serves
    pub models: Vec<String>,
}

/// Detected local runtimes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProviders {
    /// Ollama status
    pub ollama: RuntimeStatus,
    /// LM Studio status
    pub lmstudio: RuntimeStatus,
}

impl LocalProviders {
    /// Status of one runtime
    #[must_use]
    pub fn get(&self, runtime: LocalRuntime) -> &RuntimeStatus {
        match runtime {
            LocalRuntime::Ollama => &self.ollama,
            LocalRuntime::LmStudio => &self.lmstudio,
        }
    }
}

/// Concurrent detector for local model runtimes
#[derive(Debug, Clone)]
pub struct LocalDetector {
    client: Client,
    timeout: Duration,
    ollama_url: String,
    lmstudio_url: String,
}

impl LocalDetector {
    /// Detector probing the default local ports
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
            ollama_url: format!("{}/api/tags", LocalRuntime::Ollama.default_base_url()),
            lmstudio_url: format!("{}/models", LocalRuntime::LmStudio.default_base_url()),
        }
    }

    /// Detector probing the configured local endpoints
    ///
    /// A configured `base_url` for `ollama` or `lmstudio` replaces that
    /// runtime's default port; other runtimes keep the defaults.
    #[must_use]
    pub fn from_providers(providers: &[ProviderConfig], timeout: Duration) -> Self {
        let mut detector = Self::new(timeout);
        for provider in providers {
            let (ProviderId::Local(runtime), Some(base)) = (&provider.provider, &provider.base_url)
            else {
                continue;
            };
            let base = base.trim_end_matches('/');
            detector = match runtime {
                LocalRuntime::Ollama => detector.with_ollama_url(format!("{base}/api/tags")),
                LocalRuntime::LmStudio => detector.with_lmstudio_url(format!("{base}/models")),
            };
        }
        detector
    }

    /// Override the Ollama tags URL
    #[must_use]
    pub fn with_ollama_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_url = url.into();
        self
    }

    /// Override the LM Studio models URL
    #[must_use]
    pub fn with_lmstudio_url(mut self, url: impl Into<String>) -> Self {
        self.lmstudio_url = url.into();
        self
    }

    /// Probe both runtimes at once
    pub async fn detect(&self) -> LocalProviders {
        let (ollama, lmstudio) = tokio::join!(
            self.probe(LocalRuntime::Ollama, &self.ollama_url),
            self.probe(LocalRuntime::LmStudio, &self.lmstudio_url),
        );
        LocalProviders { ollama, lmstudio }
    }

    async fn probe(&self, runtime: LocalRuntime, url: &str) -> RuntimeStatus {
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                debug!(runtime = runtime.as_str(), status = %resp.status(), "Local runtime answered with an error");
                return RuntimeStatus::default();
            }
            Err(e) => {
                debug!(runtime = runtime.as_str(), error = %e, "Local runtime not reachable");
                return RuntimeStatus::default();
            }
        };

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let models = parse_models(runtime, &body);
        debug!(runtime = runtime.as_str(), models = models.len(), "Local runtime detected");

        RuntimeStatus {
            available: true,
            models,
        }
    }
}

/// Model names from a runtime's listing
///
/// Ollama lists `models[].name`, LM Studio `data[].id`. Missing or mistyped
/// fields yield an empty list.
#[must_use]
pub fn parse_models(runtime: LocalRuntime, body: &Value) -> Vec<String> {
    let (list, field) = match runtime {
        LocalRuntime::Ollama => ("models", "name"),
        LocalRuntime::LmStudio => ("data", "id"),
    };

    body.get(list)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get(field).and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// One-shot detection against the default ports
pub async fn detect_local_providers(timeout: Duration) -> LocalProviders {
    LocalDetector::new(timeout).detect().await
}
