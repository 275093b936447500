//! Router - provider selection
//!
//! Turns a prompt plus optional hints into a [`RoutingDecision`]:
//!
//! 1. A user override short-circuits everything
//! 2. The task type is inferred from the prompt when not supplied
//! 3. Providers are filtered by capability, then by remaining daily budget
//! 4. Survivors are sorted by estimated cost or by the quality ranking
//!
//! # Module Structure
//!
//! - `types`: Core types (TaskType, RoutingStrategy, RoutingDecision)
//! - `classifier`: Ordered prompt rules producing a TaskType
//! - `rules`: Tunable routing data (quality ranking, image allow-list)
//! - `capability`: Capability filter
//! - `budget`: Budget gate
//! - `mock`: Scripted provider client for testing
//! - `router_impl`: Router implementation

mod budget;
mod capability;
mod classifier;
mod mock;
mod router_impl;
mod rules;
mod types;

#[cfg(test)]
mod tests;

pub use budget::BudgetGate;
pub use capability::{can_serve, capable_providers};
pub use classifier::classify;
pub use mock::{MockProviderClient, RecordedCall};
pub use router_impl::{Router, RoutingOptions};
pub use rules::{quality_note, QualityRanking, RoutingSettings, UNRANKED};
pub use types::{Alternative, RoutingDecision, RoutingStrategy, TaskType};
