//! HTTP boundary for inbound chat messages

mod handlers;
mod types;

pub use handlers::create_router;

use crate::pipeline::SharedOrchestrator;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SharedOrchestrator>,
    pub command_prefix: String,
    pub max_message_characters: usize,
    /// Bearer token inbound requests must present, if any
    pub platform_token: Option<String>,
}

impl AppState {
    pub fn new(
        orchestrator: SharedOrchestrator,
        command_prefix: impl Into<String>,
        max_message_characters: usize,
        platform_token: Option<String>,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            command_prefix: command_prefix.into(),
            max_message_characters,
            platform_token,
        }
    }
}
