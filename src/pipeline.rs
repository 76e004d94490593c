//! Per-message pipeline
//!
//! Runs query formulation, link fetching and answer synthesis for one inbound
//! message against the sender's transcript, and owns the order in which the
//! transcript is mutated.

mod orchestrator;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use orchestrator::{PipelineError, TurnOrchestrator};
pub use traits::*;

use std::sync::Arc;

/// Orchestrator over type-erased capabilities, as held by the HTTP layer
pub type SharedOrchestrator =
    TurnOrchestrator<Arc<dyn CompletionClient>, Arc<dyn DocumentFetcher>>;
