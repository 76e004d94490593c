//! The three LLM-backed stages of a turn
//!
//! Stages read the transcript they are given and return text; they never
//! touch the transcript store. Only a completion failure is an error, every
//! fetch problem is absorbed where it happens.

mod answer;
mod link;
mod query;

pub use answer::{truncate_chars, AnswerStage};
pub use link::LinkStage;
pub use query::QueryStage;
