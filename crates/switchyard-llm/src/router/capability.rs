//! Capability filter
//!
//! Decides whether a provider configuration can serve a task type.

use super::rules::RoutingSettings;
use super::types::TaskType;
use crate::provider::ProviderConfig;

/// Whether `provider` can serve `task`
///
/// A provider qualifies when its capability set intersects the task's
/// required set. `General` requires nothing. Image generation also accepts
/// any provider on the settings allow-list, for configs whose capability
/// metadata predates the `image_generation` tag.
#[must_use]
pub fn can_serve(provider: &ProviderConfig, task: TaskType, settings: &RoutingSettings) -> bool {
    let required = task.required_capabilities();
    if required.is_empty() {
        return true;
    }

    if required.iter().any(|cap| provider.capabilities.contains(cap)) {
        return true;
    }

    task == TaskType::ImageGeneration
        && settings
            .image_generation_providers
            .contains(&provider.provider)
}

/// Providers able to serve `task`, in configuration order
#[must_use]
pub fn capable_providers<'a>(
    providers: &'a [ProviderConfig],
    task: TaskType,
    settings: &RoutingSettings,
) -> Vec<&'a ProviderConfig> {
    providers
        .iter()
        .filter(|p| can_serve(p, task, settings))
        .collect()
}
