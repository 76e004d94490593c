//! Answer synthesis: the user-facing reply

use crate::llm::LlmError;
use crate::pipeline::CompletionClient;
use crate::transcript::Turn;

pub struct AnswerStage {
    instruction: String,
    max_characters: usize,
}

impl AnswerStage {
    pub fn new(instruction: impl Into<String>, max_characters: usize) -> Self {
        Self {
            instruction: instruction.into(),
            max_characters,
        }
    }

    /// Generate the reply, cut to the character limit whatever the model did
    pub async fn run<C>(&self, client: &C, transcript: &[Turn]) -> Result<String, LlmError>
    where
        C: CompletionClient + ?Sized,
    {
        let response = client.complete(&self.instruction, transcript).await?;
        let reply = truncate_chars(&response, self.max_characters);
        if reply.len() < response.len() {
            tracing::info!(
                generated_chars = response.chars().count(),
                max_chars = self.max_characters,
                "Answer truncated"
            );
        }
        Ok(reply)
    }
}

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
