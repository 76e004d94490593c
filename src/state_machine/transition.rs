//! Pure state transition function

use super::{Effect, TurnContext, TurnEvent, TurnState};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Turn already finished in state {0}")]
    Finished(&'static str),
    #[error("Invalid transition: {event} in state {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs. Transitions are
/// strictly sequential; no event moves a turn backwards.
pub fn transition(
    state: &TurnState,
    context: &TurnContext,
    event: TurnEvent,
) -> Result<TransitionResult, TransitionError> {
    if state.is_terminal() {
        return Err(TransitionError::Finished(state.name()));
    }

    match (state, event) {
        // The search block is folded even when nothing was fetched; only the
        // paper fold depends on having content.
        (TurnState::Received, TurnEvent::SearchCompleted { results }) => {
            Ok(TransitionResult::new(TurnState::Queried)
                .with_effect(Effect::fold_search_results(&results, &context.question)))
        }

        (TurnState::Queried, TurnEvent::LinkChecked { document }) => {
            let result = TransitionResult::new(TurnState::LinkChecked);
            if document.is_empty() {
                Ok(result)
            } else {
                Ok(result.with_effect(Effect::fold_paper(&document, &context.question)))
            }
        }

        (TurnState::LinkChecked, TurnEvent::AnswerReady { text }) => {
            Ok(TransitionResult::new(TurnState::Answered)
                .with_effect(Effect::RecordAnswer { text })
                .with_effect(Effect::Persist))
        }

        (TurnState::Answered, TurnEvent::Stored) => {
            Ok(TransitionResult::new(TurnState::Persisted).with_effect(Effect::Reply))
        }

        // A failure only counts for the stage the turn is actually waiting on.
        // Whatever was folded in so far is still stored: there is no rollback.
        (current, TurnEvent::StageFailed { stage, message })
            if current.pending_stage() == Some(stage) =>
        {
            Ok(TransitionResult::new(TurnState::Failed { stage, message })
                .with_effect(Effect::Persist))
        }

        (current, event) => Err(TransitionError::InvalidTransition {
            state: current.name(),
            event: event.name(),
        }),
    }
}
