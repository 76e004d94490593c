//! Link fetching: optionally read one full paper

use crate::llm::LlmError;
use crate::pipeline::{CompletionClient, DocumentFetcher};
use crate::transcript::Turn;

pub struct LinkStage {
    instruction: String,
}

impl LinkStage {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
        }
    }

    /// Ask which paper to read, convert it, and return its text.
    ///
    /// An empty string means no paper: either none was requested or it could
    /// not be retrieved.
    pub async fn run<C, F>(
        &self,
        client: &C,
        fetcher: &F,
        transcript: &[Turn],
    ) -> Result<String, LlmError>
    where
        C: CompletionClient + ?Sized,
        F: DocumentFetcher + ?Sized,
    {
        let response = client.complete(&self.instruction, transcript).await?;

        let Some(link) = normalize_link(&response) else {
            tracing::debug!("No paper requested");
            return Ok(String::new());
        };

        match fetcher.convert_document(&link).await {
            Ok(pages) => {
                tracing::info!(url = %link, pages = pages.len(), "Paper converted");
                Ok(pages.join("\n\n"))
            }
            Err(error) => {
                tracing::warn!(url = %link, error = %error, "Paper retrieval failed, continuing without it");
                Ok(String::new())
            }
        }
    }
}

/// Normalize the first line of the model's reply into a link.
///
/// `http://` is upgraded to `https://` and one trailing period is dropped.
/// Returns `None` for an empty reply or the token "none" in any case.
pub fn normalize_link(response: &str) -> Option<String> {
    let first = response.lines().next().unwrap_or_default().trim();

    let upgraded = match first.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => first.to_string(),
    };
    let link = upgraded.strip_suffix('.').unwrap_or(&upgraded);

    if link.is_empty() || link.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(link.to_string())
    }
}
