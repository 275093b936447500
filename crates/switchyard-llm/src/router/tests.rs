//! Tests for router module

use super::*;
use crate::error::Error;
use crate::provider::{ProviderConfig, ProviderId};

fn coder(name: &str, input: f64, output: f64) -> ProviderConfig {
    ProviderConfig::new(name, format!("{name}-model"))
        .with_capabilities([TaskType::CodeGeneration, TaskType::DeepReasoning])
        .with_cost(input, output)
        .with_budget(10.0, 0.0)
}

fn id(name: &str) -> ProviderId {
    ProviderId::from(name)
}

#[test]
fn test_end_to_end_budget_then_cost() {
    let router = Router::new(vec![
        coder("anthropic", 3.0, 15.0).with_budget(10.0, 10.0),
        coder("openai", 2.5, 10.0).with_budget(10.0, 0.0),
    ]);

    let decision = router
        .route("debug this null pointer", &RoutingOptions::default())
        .unwrap();

    assert_eq!(decision.task_type(), TaskType::CodeGeneration);
    assert_eq!(decision.provider(), &id("openai"));
    assert_eq!(decision.model(), "openai-model");
    assert!(decision.reasoning().contains("code generation"));
    assert!(decision.alternatives().is_empty());
}

#[test]
fn test_cost_strategy_sorts_ascending() {
    // prompt of 2M chars ~ 500k tokens, so cost = rate * 0.5
    let prompt = "x".repeat(2_000_000);
    let router = Router::new(vec![
        coder("anthropic", 0.02, 0.0),
        coder("openai", 0.06, 0.0),
        coder("google", 0.04, 0.0),
    ]);

    let decision = router
        .route(
            &prompt,
            &RoutingOptions::default().with_strategy(RoutingStrategy::CostOptimized),
        )
        .unwrap();

    assert_eq!(decision.provider(), &id("anthropic"));
    assert!((decision.estimated_cost() - 0.005).abs() < 1e-9);

    let alts: Vec<_> = decision.alternatives().iter().map(|a| a.provider.clone()).collect();
    assert_eq!(alts, vec![id("google"), id("openai")]);
    assert!(decision.alternatives()[0].estimated_cost < decision.alternatives()[1].estimated_cost);
}

#[test]
fn test_alternatives_capped_at_two() {
    let router = Router::new(vec![
        coder("deepseek", 0.1, 0.1),
        coder("mistral", 0.2, 0.2),
        coder("google", 0.3, 0.3),
        coder("openai", 0.4, 0.4),
    ]);
    let decision = router.route("hello", &RoutingOptions::default()).unwrap();
    assert_eq!(decision.provider(), &id("deepseek"));
    assert_eq!(decision.alternatives().len(), 2);
}

#[test]
fn test_deep_reasoning_prefers_quality() {
    let router = Router::new(vec![
        coder("deepseek", 0.1, 0.1),
        coder("openai", 2.5, 10.0),
        coder("anthropic", 3.0, 15.0),
    ]);

    let decision = router
        .route("analyze the causes of inflation", &RoutingOptions::default())
        .unwrap();

    assert_eq!(decision.task_type(), TaskType::DeepReasoning);
    assert_eq!(decision.provider(), &id("anthropic"));
    let alts: Vec<_> = decision.alternatives().iter().map(|a| a.provider.clone()).collect();
    assert_eq!(alts, vec![id("openai"), id("deepseek")]);
}

#[test]
fn test_explicit_cost_beats_deep_reasoning() {
    let router = Router::new(vec![coder("anthropic", 3.0, 15.0), coder("deepseek", 0.1, 0.1)]);
    let decision = router
        .route(
            "analyze this",
            &RoutingOptions::default().with_strategy(RoutingStrategy::CostOptimized),
        )
        .unwrap();
    assert_eq!(decision.provider(), &id("deepseek"));
}

#[test]
fn test_quality_strategy_uses_configured_ranking() {
    let settings = RoutingSettings {
        quality_ranking: QualityRanking::new(vec![id("mistral"), id("anthropic")]),
        ..RoutingSettings::default()
    };
    let router = Router::new(vec![coder("anthropic", 3.0, 15.0), coder("mistral", 2.0, 6.0)])
        .with_settings(settings);

    let decision = router
        .route(
            "hello",
            &RoutingOptions::default().with_strategy(RoutingStrategy::QualityOptimized),
        )
        .unwrap();
    assert_eq!(decision.provider(), &id("mistral"));
}

#[test]
fn test_user_override_is_unconditional() {
    let router = Router::new(vec![
        coder("anthropic", 3.0, 15.0).with_budget(10.0, 50.0),
        coder("deepseek", 0.1, 0.1),
    ]);

    let decision = router
        .route("fix this code", &RoutingOptions::default().with_override("anthropic"))
        .unwrap();

    assert_eq!(decision.provider(), &id("anthropic"));
    assert_eq!(decision.reasoning(), "User override");
    assert!(decision.alternatives().is_empty());
}

#[test]
fn test_unknown_override_routes_normally() {
    let router = Router::new(vec![coder("deepseek", 0.1, 0.1)]);
    let decision = router
        .route("hello", &RoutingOptions::default().with_override("openai"))
        .unwrap();
    assert_eq!(decision.provider(), &id("deepseek"));
    assert_ne!(decision.reasoning(), "User override");
}

#[test]
fn test_unsupported_override_rejected() {
    let router = Router::new(vec![ProviderConfig::new("together", "llama").with_budget(5.0, 0.0)]);
    let err = router
        .route("hello", &RoutingOptions::default().with_override("together"))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedProvider(_)));
}

#[test]
fn test_budget_exhausted_never_returns_decision() {
    let router = Router::new(vec![
        coder("anthropic", 3.0, 15.0).with_budget(10.0, 10.0),
        coder("openai", 2.5, 10.0).with_budget(5.0, 6.0),
    ]);
    let err = router
        .route("implement a parser", &RoutingOptions::default())
        .unwrap_err();
    assert!(err.is_budget_exhausted());
}

#[test]
fn test_no_capable_provider_is_not_budget_exhaustion() {
    let router = Router::new(vec![coder("anthropic", 3.0, 15.0)]);
    let err = router
        .route("what is in this screenshot", &RoutingOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotConfigured(_)));
}

#[test]
fn test_image_generation_allow_list() {
    let router = Router::new(vec![
        ProviderConfig::new("anthropic", "claude").with_budget(10.0, 0.0),
        ProviderConfig::new("openai", "gpt-image-1").with_budget(10.0, 0.0),
    ]);
    let decision = router
        .route("generate an image of a cat", &RoutingOptions::default())
        .unwrap();
    assert_eq!(decision.task_type(), TaskType::ImageGeneration);
    assert_eq!(decision.provider(), &id("openai"));
}

#[test]
fn test_low_budget_warning_in_reasoning() {
    let router = Router::new(vec![coder("openai", 2.5, 10.0).with_budget(10.0, 9.0)]);
    let decision = router.route("fix the bug", &RoutingOptions::default()).unwrap();
    assert!(decision.reasoning().contains("Low budget remaining: $1.00 of $10.00"));

    let router = Router::new(vec![coder("openai", 2.5, 10.0).with_budget(10.0, 5.0)]);
    let decision = router.route("fix the bug", &RoutingOptions::default()).unwrap();
    assert!(!decision.reasoning().contains("Low budget"));
}

#[test]
fn test_reasoning_includes_quality_note() {
    let router = Router::new(vec![coder("anthropic", 3.0, 15.0)]);
    let decision = router.route("fix the bug", &RoutingOptions::default()).unwrap();
    let note = quality_note(&id("anthropic")).unwrap();
    assert!(decision.reasoning().contains(note));
    assert!(decision.reasoning().starts_with(TaskType::CodeGeneration.routing_note()));
}

#[test]
fn test_supplied_task_type_skips_classifier() {
    let router = Router::new(vec![
        ProviderConfig::new("google", "gemini")
            .with_capabilities([TaskType::VisionAnalysis])
            .with_budget(10.0, 0.0),
        coder("deepseek", 0.1, 0.1),
    ]);
    let decision = router
        .route(
            "fix this function",
            &RoutingOptions::default().with_task_type(TaskType::VisionAnalysis),
        )
        .unwrap();
    assert_eq!(decision.task_type(), TaskType::VisionAnalysis);
    assert_eq!(decision.provider(), &id("google"));
}

#[test]
fn test_custom_provider_without_endpoint_is_skipped() {
    // unpriced, so it would otherwise win the cost sort at $0
    let router = Router::new(vec![
        ProviderConfig::new("my-gateway", "llama").with_budget(10.0, 0.0),
        ProviderConfig::new("openai", "gpt-5")
            .with_cost(1.25, 10.0)
            .with_budget(10.0, 0.0),
    ]);
    let decision = router.route("hello", &RoutingOptions::default()).unwrap();
    assert_eq!(decision.provider(), &id("openai"));
    assert!(decision.alternatives().is_empty());
}

#[test]
fn test_custom_provider_with_endpoint_is_routable() {
    let router = Router::new(vec![
        ProviderConfig::new("my-gateway", "llama")
            .with_base_url("http://10.0.0.2:8000/v1")
            .with_budget(10.0, 0.0),
        ProviderConfig::new("openai", "gpt-5")
            .with_cost(1.25, 10.0)
            .with_budget(10.0, 0.0),
    ]);
    let decision = router.route("hello", &RoutingOptions::default()).unwrap();
    assert_eq!(decision.provider(), &id("my-gateway"));
}

#[test]
fn test_only_unsupported_providers_is_not_configured() {
    let router = Router::new(vec![ProviderConfig::new("my-gateway", "llama").with_budget(10.0, 0.0)]);
    let err = router.route("hello", &RoutingOptions::default()).unwrap_err();
    assert!(matches!(err, Error::NotConfigured(_)));
}
