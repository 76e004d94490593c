//! Query formulation: turn the conversation into search requests and fetch them

use crate::fetch::FetchError;
use crate::llm::LlmError;
use crate::pipeline::{CompletionClient, DocumentFetcher};
use crate::transcript::Turn;
use futures::stream::{self, StreamExt};

/// Upper bound on simultaneous search fetches
pub const MAX_CONCURRENT_FETCHES: usize = 4;

/// Result of fetching one candidate URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched { url: String, body: String },
    Failed { url: String, error: FetchError },
}

pub struct QueryStage {
    instruction: String,
}

impl QueryStage {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
        }
    }

    /// Ask for search URLs, fetch each, and return the concatenated bodies.
    ///
    /// Returns an empty string when no URL was emitted or none could be fetched.
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
        let candidates = parse_candidates(&response);
        tracing::debug!(candidates = candidates.len(), "Search requests formulated");

        let outcomes: Vec<FetchOutcome> = stream::iter(candidates.into_iter().map(str::to_owned))
            .map(|url: String| async move { fetch_one(fetcher, &url).await })
            .buffered(MAX_CONCURRENT_FETCHES)
            .collect()
            .await;
        Ok(aggregate(&outcomes))
    }
}

/// Every trimmed, non-empty line of the response is a URL candidate
pub fn parse_candidates(response: &str) -> Vec<&str> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

async fn fetch_one<F: DocumentFetcher + ?Sized>(fetcher: &F, url: &str) -> FetchOutcome {
    match fetcher.fetch_text(url).await {
        Ok(body) => FetchOutcome::Fetched {
            url: url.to_string(),
            body,
        },
        Err(error) => FetchOutcome::Failed {
            url: url.to_string(),
            error,
        },
    }
}

/// Bodies in candidate order, each followed by a blank line
fn aggregate(outcomes: &[FetchOutcome]) -> String {
    let mut information = String::new();
    for outcome in outcomes {
        match outcome {
            FetchOutcome::Fetched { url, body } => {
                tracing::debug!(url = %url, bytes = body.len(), "Search results fetched");
                information.push_str(body);
                information.push_str("\n\n");
            }
            FetchOutcome::Failed { url, error } => {
                tracing::warn!(url = %url, error = %error, "Invalid query, skipping");
            }
        }
    }
    information
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use crate::pipeline::testing::{MockCompletionClient, MockDocumentFetcher};
    use std::time::Duration;

    const URL_A: &str = "http://export.arxiv.org/api/query?search_query=ti:attention";
    const URL_B: &str = "http://export.arxiv.org/api/query?id_list=1706.03762";

    #[test]
    fn test_parse_candidates_trims_and_skips_blank_lines() {
        let response = format!("  {URL_A}  \n\n\t{URL_B}\r\n   \n");
        assert_eq!(parse_candidates(&response), vec![URL_A, URL_B]);
        assert!(parse_candidates("").is_empty());
        assert!(parse_candidates(" \n \n").is_empty());
    }

    #[tokio::test]
    async fn test_successful_bodies_accumulate_in_order() {
        let client = MockCompletionClient::new();
        client.queue_response(format!("{URL_A}\n{URL_B}"));
        let fetcher = MockDocumentFetcher::new()
            .with_failing_page(URL_A)
            .with_page(URL_B, "ABC");

        let stage = QueryStage::new("query instruction");
        let result = stage
            .run(&client, &fetcher, &[Turn::user("What is attention?")])
            .await
            .unwrap();

        assert_eq!(result, "ABC\n\n");
        assert_eq!(fetcher.fetched_urls(), vec![URL_A, URL_B]);
        assert_eq!(client.recorded_requests()[0].system, "query instruction");
    }

    #[tokio::test]
    async fn test_fetch_fan_out_is_bounded_and_ordered() {
        let urls: Vec<String> = (0..20)
            .map(|i| format!("http://export.arxiv.org/api/query?id_list={i}"))
            .collect();
        let client = MockCompletionClient::new();
        client.queue_response(urls.join("\n"));
        let fetcher = urls
            .iter()
            .enumerate()
            .fold(MockDocumentFetcher::new(), |f, (i, url)| {
                f.with_page(url.as_str(), i.to_string())
            })
            .with_delay(Duration::from_millis(5));

        let result = QueryStage::new("q")
            .run(&client, &fetcher, &[Turn::user("hi")])
            .await
            .unwrap();

        assert_eq!(fetcher.max_in_flight(), MAX_CONCURRENT_FETCHES);
        let expected: String = (0..20).map(|i| format!("{i}\n\n")).collect();
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn test_all_failures_yield_empty() {
        let client = MockCompletionClient::new();
        client.queue_response(URL_A);
        let fetcher = MockDocumentFetcher::new().with_failing_page(URL_A);

        let result = QueryStage::new("q")
            .run(&client, &fetcher, &[Turn::user("hi")])
            .await
            .unwrap();
        assert_eq!(result, "");
    }

    #[tokio::test]
    async fn test_no_candidates_fetches_nothing() {
        let client = MockCompletionClient::new();
        client.queue_response("\n");
        let fetcher = MockDocumentFetcher::new();

        let result = QueryStage::new("q")
            .run(&client, &fetcher, &[Turn::user("hi")])
            .await
            .unwrap();
        assert_eq!(result, "");
        assert!(fetcher.fetched_urls().is_empty());
    }

    #[tokio::test]
    async fn test_completion_failure_propagates() {
        let client = MockCompletionClient::new();
        client.queue_error(LlmError::server_error("Server error: overloaded"));
        let fetcher = MockDocumentFetcher::new();

        let err = QueryStage::new("q")
            .run(&client, &fetcher, &[Turn::user("hi")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ServerError);
    }
}
