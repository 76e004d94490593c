//! Mock implementations for testing
//!
//! These mocks enable pipeline testing without real I/O.

use super::traits::{CompletionClient, DocumentFetcher};
use crate::fetch::FetchError;
use crate::llm::LlmError;
use crate::transcript::Turn;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Completion Client
// ============================================================================

/// A completion call as the client saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCompletion {
    pub system: String,
    pub messages: Vec<Turn>,
}

/// Mock completion client that returns queued responses
pub struct MockCompletionClient {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// Record of all requests made
    pub requests: Mutex<Vec<RecordedCompletion>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Suspend every call for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue a successful response
    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<RecordedCompletion> {
        self.requests.lock().unwrap().clone()
    }

    /// Highest number of calls that were suspended at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(
        &self,
        system_instruction: &str,
        messages: &[Turn],
    ) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(RecordedCompletion {
            system: system_instruction.to_string(),
            messages: messages.to_vec(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

// ============================================================================
// Mock Document Fetcher
// ============================================================================

/// Mock fetcher with scripted per-URL outcomes; unknown URLs return 404
#[derive(Default)]
pub struct MockDocumentFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    documents: HashMap<String, Result<Vec<String>, FetchError>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// URLs passed to `fetch_text`, in call order
    pub fetched: Mutex<Vec<String>>,
    /// URLs passed to `convert_document`, in call order
    pub converted: Mutex<Vec<String>>,
}

impl MockDocumentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend every fetch for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Ok(body.into()));
        self
    }

    pub fn with_failing_page(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        let error = FetchError::Timeout { url: url.clone() };
        self.pages.insert(url, Err(error));
        self
    }

    pub fn with_document(mut self, url: impl Into<String>, pages: &[&str]) -> Self {
        self.documents.insert(
            url.into(),
            Ok(pages.iter().map(ToString::to_string).collect()),
        );
        self
    }

    pub fn with_failing_document(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        let error = FetchError::Conversion {
            url: url.clone(),
            message: "mock conversion failure".to_string(),
        };
        self.documents.insert(url, Err(error));
        self
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn converted_urls(&self) -> Vec<String> {
        self.converted.lock().unwrap().clone()
    }

    /// Highest number of fetches that were suspended at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn not_found(url: &str) -> FetchError {
        FetchError::Status {
            url: url.to_string(),
            status: 404,
        }
    }
}

#[async_trait]
impl DocumentFetcher for MockDocumentFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pause().await;
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(Self::not_found(url)))
    }

    async fn convert_document(&self, url: &str) -> Result<Vec<String>, FetchError> {
        self.converted.lock().unwrap().push(url.to_string());
        self.pause().await;
        self.documents
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(Self::not_found(url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_completion_client() {
        let mock = MockCompletionClient::new();
        mock.queue_response("Hello");

        let text = mock.complete("system", &[Turn::user("hi")]).await.unwrap();
        assert_eq!(text, "Hello");

        // Second call should fail (no more responses)
        assert!(mock.complete("system", &[Turn::user("hi")]).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
        assert_eq!(mock.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_mock_document_fetcher() {
        let fetcher = MockDocumentFetcher::new()
            .with_page("https://a", "body")
            .with_document("https://paper", &["p1", "p2"]);

        assert_eq!(fetcher.fetch_text("https://a").await.unwrap(), "body");
        assert!(matches!(
            fetcher.fetch_text("https://b").await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert_eq!(
            fetcher.convert_document("https://paper").await.unwrap(),
            vec!["p1".to_string(), "p2".to_string()]
        );
        assert_eq!(fetcher.fetched_urls(), vec!["https://a", "https://b"]);
    }
}
