//! Events that advance a turn

use super::Stage;

/// Stage outcomes fed into the transition function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// Query stage finished; `results` is empty when nothing was fetched
    SearchCompleted { results: String },

    /// Link stage finished; `document` is empty when no paper was read
    LinkChecked { document: String },

    /// Answer stage produced the (already truncated) reply text
    AnswerReady { text: String },

    /// The transcript store accepted the turn
    Stored,

    /// A stage failed fatally
    StageFailed { stage: Stage, message: String },
}

impl TurnEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TurnEvent::SearchCompleted { .. } => "search_completed",
            TurnEvent::LinkChecked { .. } => "link_checked",
            TurnEvent::AnswerReady { .. } => "answer_ready",
            TurnEvent::Stored => "stored",
            TurnEvent::StageFailed { .. } => "stage_failed",
        }
    }
}
