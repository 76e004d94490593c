//! API request and response types

use crate::transcript::Turn;
use serde::{Deserialize, Serialize};

/// An inbound chat message as delivered by the platform
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub author_id: String,
    pub content: String,
    #[serde(default)]
    pub author_is_bot: bool,
}

/// Reply to deliver back to the channel; `None` means stay silent
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplyResponse {
    pub reply: Option<String>,
}

impl ReplyResponse {
    pub fn silent() -> Self {
        Self { reply: None }
    }

    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }
}

/// Stored transcript for one identity
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub turns: Vec<Turn>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
