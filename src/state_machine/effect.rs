//! Effects produced by state transitions

use crate::prompts::{paper_directive, search_directive};

/// Effects to be applied by the orchestrator after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append text to the in-progress user turn
    FoldIn { block: String },

    /// Keep the answer as the pending assistant turn
    RecordAnswer { text: String },

    /// Write the working turns into the transcript store
    Persist,

    /// Deliver the recorded answer to the user
    Reply,
}

impl Effect {
    pub fn fold_search_results(results: &str, question: &str) -> Self {
        Effect::FoldIn {
            block: format!("\n\n{results}{}", search_directive(question)),
        }
    }

    pub fn fold_paper(document: &str, question: &str) -> Self {
        Effect::FoldIn {
            block: format!("\n\n{document}\n\n{}", paper_directive(question)),
        }
    }
}
