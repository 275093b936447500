//! Core types for LLM routing
//!
//! This module contains TaskType, RoutingStrategy and the RoutingDecision
//! produced by one routing pass.

use crate::provider::ProviderId;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Task Type
// ============================================================================

/// Coarse task category inferred from the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Analysis, research, multi-step reasoning
    DeepReasoning,
    /// Writing or fixing code
    CodeGeneration,
    /// High-volume, low-complexity processing
    BulkProcessing,
    /// JSON, tables, lists
    StructuredOutput,
    /// Understanding images and screenshots
    VisionAnalysis,
    /// Producing images
    ImageGeneration,
    /// Everything else
    General,
}

impl TaskType {
    /// All task types
    pub const ALL: [TaskType; 7] = [
        Self::DeepReasoning,
        Self::CodeGeneration,
        Self::BulkProcessing,
        Self::StructuredOutput,
        Self::VisionAnalysis,
        Self::ImageGeneration,
        Self::General,
    ];

    /// Wire name (snake_case)
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepReasoning => "deep_reasoning",
            Self::CodeGeneration => "code_generation",
            Self::BulkProcessing => "bulk_processing",
            Self::StructuredOutput => "structured_output",
            Self::VisionAnalysis => "vision_analysis",
            Self::ImageGeneration => "image_generation",
            Self::General => "general",
        }
    }

    /// Capability tags a provider must have (any one of) to serve this task
    ///
    /// `General` requires nothing: every provider qualifies.
    #[must_use]
    pub fn required_capabilities(&self) -> &'static [TaskType] {
        match self {
            Self::DeepReasoning => &[Self::DeepReasoning],
            Self::CodeGeneration => &[Self::CodeGeneration],
            Self::BulkProcessing => &[Self::BulkProcessing],
            Self::StructuredOutput => &[Self::StructuredOutput],
            Self::VisionAnalysis => &[Self::VisionAnalysis],
            Self::ImageGeneration => &[Self::ImageGeneration],
            Self::General => &[],
        }
    }

    /// Reasoning line explaining why this task type shaped the choice
    #[must_use]
    pub fn routing_note(&self) -> &'static str {
        match self {
            Self::DeepReasoning => "Task requires deep reasoning; preferring quality over price",
            Self::CodeGeneration => "Task involves code generation",
            Self::BulkProcessing => "Task is bulk processing; preferring low cost",
            Self::StructuredOutput => "Task needs structured output",
            Self::VisionAnalysis => "Task involves vision analysis",
            Self::ImageGeneration => "Task involves image generation",
            Self::General => "General task",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().replace('_', " "))
    }
}

impl std::str::FromStr for TaskType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| crate::error::Error::Config(format!("unknown task type: {s}")))
    }
}

// ============================================================================
// Strategy
// ============================================================================

/// Explicit sort strategy requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Cheapest first
    CostOptimized,
    /// Highest quality rank first
    QualityOptimized,
}

impl std::str::FromStr for RoutingStrategy {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cost_optimized" | "cost" => Ok(Self::CostOptimized),
            "quality_optimized" | "quality" => Ok(Self::QualityOptimized),
            other => Err(crate::error::Error::Config(format!(
                "unknown routing strategy: {other}"
            ))),
        }
    }
}

// ============================================================================
// Routing Decision
// ============================================================================

/// A runner-up provider and what it would have cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    /// Provider identifier
    pub provider: ProviderId,
    /// Estimated cost in USD
    pub estimated_cost: f64,
}

/// Result of one routing pass
///
/// Built once per request and never mutated; fields are read through
/// accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    provider: ProviderId,
    model: String,
    reasoning: String,
    estimated_cost: f64,
    alternatives: Vec<Alternative>,
    task_type: TaskType,
}

impl RoutingDecision {
    pub(crate) fn new(
        provider: ProviderId,
        model: String,
        reasoning: Vec<String>,
        estimated_cost: f64,
        alternatives: Vec<Alternative>,
        task_type: TaskType,
    ) -> Self {
        Self {
            provider,
            model,
            reasoning: reasoning.join(". "),
            estimated_cost,
            alternatives,
            task_type,
        }
    }

    /// Chosen provider
    #[must_use]
    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// Chosen model
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Human-readable reasoning trace
    #[must_use]
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Estimated cost in USD
    #[must_use]
    pub fn estimated_cost(&self) -> f64 {
        self.estimated_cost
    }

    /// Up to two runner-up providers
    #[must_use]
    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    /// Task type the decision was made for
    #[must_use]
    pub fn task_type(&self) -> TaskType {
        self.task_type
    }
}
