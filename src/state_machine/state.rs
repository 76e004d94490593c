//! Turn state types

use crate::transcript::UserId;
use std::fmt;

/// An LLM-backed processing step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Query,
    Link,
    Answer,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Query => "query",
            Stage::Link => "link",
            Stage::Answer => "answer",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of one inbound message through the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TurnState {
    /// User text accepted as the in-progress user turn
    #[default]
    Received,

    /// Search results (if any) folded into the user turn
    Queried,

    /// Full paper (if any) folded into the user turn
    LinkChecked,

    /// Final answer produced, not yet stored
    Answered,

    /// Turns stored and reply emitted
    Persisted,

    /// A stage failed; no reply is produced for this message
    Failed { stage: Stage, message: String },
}

impl TurnState {
    /// Terminal states accept no further events
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Persisted | TurnState::Failed { .. })
    }

    /// The stage whose outcome this state is waiting for
    pub fn pending_stage(&self) -> Option<Stage> {
        match self {
            TurnState::Received => Some(Stage::Query),
            TurnState::Queried => Some(Stage::Link),
            TurnState::LinkChecked => Some(Stage::Answer),
            TurnState::Answered | TurnState::Persisted | TurnState::Failed { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TurnState::Received => "received",
            TurnState::Queried => "queried",
            TurnState::LinkChecked => "link_checked",
            TurnState::Answered => "answered",
            TurnState::Persisted => "persisted",
            TurnState::Failed { .. } => "failed",
        }
    }
}

/// Immutable facts about the message being processed
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub turn_id: String,
    pub user_id: UserId,
    /// The user's original text, quoted verbatim by the fold-in directives
    pub question: String,
}

impl TurnContext {
    pub fn new(user_id: UserId, question: impl Into<String>) -> Self {
        Self {
            turn_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            question: question.into(),
        }
    }
}
