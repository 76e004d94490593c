//! Prefixed utility commands
//!
//! Messages that start with the command prefix bypass the pipeline and are
//! handled here.

use crate::transcript::{ResetOutcome, TranscriptStore, UserId};

pub const RESET_CONFIRMATION: &str = "Chat history has been reset.";
pub const NOTHING_TO_RESET: &str = "No chat history found to reset.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness check, optionally echoing the rest of the line
    Ping { arg: Option<String> },
    /// Clear the caller's transcript
    Reset,
    Unknown { name: String },
}

impl Command {
    /// Parse `content` if it starts with `prefix`; `None` means not a command
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let body = content.strip_prefix(prefix)?;
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body.trim_end(), ""),
        };

        let command = match name {
            "ping" => Command::Ping {
                arg: (!rest.is_empty()).then(|| rest.to_string()),
            },
            "reset" => Command::Reset,
            other => Command::Unknown {
                name: other.to_string(),
            },
        };
        Some(command)
    }

    /// Run the command for `user`; unknown commands produce no reply
    pub async fn execute(&self, user: &UserId, store: &TranscriptStore) -> Option<String> {
        match self {
            Command::Ping { arg: None } => Some("Pong!".to_string()),
            Command::Ping { arg: Some(arg) } => Some(format!("Pong! Your argument was {arg}")),
            Command::Reset => {
                let reply = match store.reset(user).await {
                    ResetOutcome::Cleared => RESET_CONFIRMATION,
                    ResetOutcome::NothingToReset => NOTHING_TO_RESET,
                };
                tracing::info!(user_id = %user, reply, "Reset command");
                Some(reply.to_string())
            }
            Command::Unknown { name } => {
                tracing::debug!(user_id = %user, command = %name, "Ignoring unknown command");
                None
            }
        }
    }
}
