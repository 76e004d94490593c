//! Per-message turn state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! orchestrator performs the I/O, feeds each stage's outcome in as an event,
//! and applies the returned effects to its working turn.

mod effect;
mod event;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::TurnEvent;
pub use state::{Stage, TurnContext, TurnState};
pub use transition::{transition, TransitionError};
