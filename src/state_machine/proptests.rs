//! Property-based tests for the turn state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::*;
use crate::transcript::UserId;
use proptest::prelude::*;

fn test_context() -> TurnContext {
    TurnContext::new(UserId::new("prop-user"), "What is attention?")
}

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![Just(Stage::Query), Just(Stage::Link), Just(Stage::Answer)]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-zA-Z0-9 .\n]{1,40}"]
}

fn arb_event() -> impl Strategy<Value = TurnEvent> {
    prop_oneof![
        arb_text().prop_map(|results| TurnEvent::SearchCompleted { results }),
        arb_text().prop_map(|document| TurnEvent::LinkChecked { document }),
        arb_text().prop_map(|text| TurnEvent::AnswerReady { text }),
        Just(TurnEvent::Stored),
        (arb_stage(), "[a-z ]{1,20}")
            .prop_map(|(stage, message)| TurnEvent::StageFailed { stage, message }),
    ]
}

fn order(state: &TurnState) -> u8 {
    match state {
        TurnState::Received => 0,
        TurnState::Queried => 1,
        TurnState::LinkChecked => 2,
        TurnState::Answered => 3,
        TurnState::Persisted | TurnState::Failed { .. } => 4,
    }
}

proptest! {
    /// Accepted transitions advance exactly one step or fail terminally
    #[test]
    fn prop_transitions_are_sequential(events in prop::collection::vec(arb_event(), 0..12)) {
        let ctx = test_context();
        let mut state = TurnState::Received;

        for event in events {
            let before = state.clone();
            match transition(&state, &ctx, event) {
                Ok(result) => {
                    prop_assert!(!before.is_terminal());
                    let advanced = order(&result.new_state) == order(&before) + 1;
                    let failed = matches!(result.new_state, TurnState::Failed { .. });
                    prop_assert!(advanced || failed, "{:?} -> {:?}", before, result.new_state);
                    state = result.new_state;
                }
                Err(_) => prop_assert_eq!(&state, &before),
            }
        }
    }

    /// Persist is emitted at most once per turn, and Reply only after it
    #[test]
    fn prop_single_persist_and_reply_after(events in prop::collection::vec(arb_event(), 0..12)) {
        let ctx = test_context();
        let mut state = TurnState::Received;
        let mut persists = 0;
        let mut replied = false;

        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                for effect in &result.effects {
                    match effect {
                        Effect::Persist => persists += 1,
                        Effect::Reply => {
                            prop_assert_eq!(persists, 1);
                            replied = true;
                        }
                        _ => {}
                    }
                }
                state = result.new_state;
            }
        }

        prop_assert!(persists <= 1);
        prop_assert_eq!(replied, state == TurnState::Persisted);
    }

    /// The search block is always folded, the paper only with content, and
    /// every fold quotes the question
    #[test]
    fn prop_fold_in_shapes(results in arb_text(), document in arb_text()) {
        let ctx = test_context();
        let queried = transition(&TurnState::Received, &ctx, TurnEvent::SearchCompleted { results: results.clone() }).unwrap();
        prop_assert_eq!(queried.effects.len(), 1);

        let checked = transition(&TurnState::Queried, &ctx, TurnEvent::LinkChecked { document: document.clone() }).unwrap();
        prop_assert_eq!(checked.effects.is_empty(), document.is_empty());

        for effect in queried.effects.iter().chain(&checked.effects) {
            if let Effect::FoldIn { block } = effect {
                prop_assert!(block.starts_with("\n\n"));
                prop_assert!(block.ends_with(&ctx.question));
            }
        }
    }
}
