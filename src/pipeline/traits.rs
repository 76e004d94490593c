//! Trait abstractions for pipeline I/O
//!
//! These traits enable testing the stages and the orchestrator with mock
//! implementations.

use crate::fetch::{FetchError, HttpFetcher, OcrClient};
use crate::llm::{LlmError, LlmMessage, LlmRequest, LlmService, MessageRole, SystemContent};
use crate::transcript::{Role, Turn};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// One text-generation call over a role-tagged transcript
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `messages` under `system_instruction`.
    ///
    /// The instruction is sent as a leading system turn and never stored.
    /// The returned text is not length-limited.
    async fn complete(&self, system_instruction: &str, messages: &[Turn])
        -> Result<String, LlmError>;
}

/// Retrieval of text from URLs
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// GET a URL and return its decoded body
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Convert a hosted document into page texts, in page order
    async fn convert_document(&self, url: &str) -> Result<Vec<String>, FetchError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(
        &self,
        system_instruction: &str,
        messages: &[Turn],
    ) -> Result<String, LlmError> {
        (**self).complete(system_instruction, messages).await
    }
}

#[async_trait]
impl<T: DocumentFetcher + ?Sized> DocumentFetcher for Arc<T> {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_text(url).await
    }

    async fn convert_document(&self, url: &str) -> Result<Vec<String>, FetchError> {
        (**self).convert_document(url).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

impl From<Role> for MessageRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        }
    }
}

/// Adapter to use an `LlmService` as the completion client, with a deadline
/// on every call
pub struct ServiceCompletionClient {
    service: Arc<dyn LlmService>,
    timeout: Duration,
}

impl ServiceCompletionClient {
    pub fn new(service: Arc<dyn LlmService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }
}

#[async_trait]
impl CompletionClient for ServiceCompletionClient {
    async fn complete(
        &self,
        system_instruction: &str,
        messages: &[Turn],
    ) -> Result<String, LlmError> {
        if messages.is_empty() {
            return Err(LlmError::invalid_request(
                "Completion requires at least one message",
            ));
        }

        let request = LlmRequest {
            system: vec![SystemContent::new(system_instruction)],
            messages: messages
                .iter()
                .map(|turn| LlmMessage {
                    role: turn.role.into(),
                    content: turn.content.clone(),
                })
                .collect(),
        };

        match tokio::time::timeout(self.timeout, self.service.complete(&request)).await {
            Ok(result) => result.map(|response| response.text),
            Err(_) => Err(LlmError::timeout(format!(
                "Completion timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

/// Adapter combining the plain fetcher and the document conversion service
pub struct WebDocumentFetcher {
    http: HttpFetcher,
    ocr: OcrClient,
}

impl WebDocumentFetcher {
    pub fn new(http: HttpFetcher, ocr: OcrClient) -> Self {
        Self { http, ocr }
    }
}

#[async_trait]
impl DocumentFetcher for WebDocumentFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.http.fetch_text(url).await
    }

    async fn convert_document(&self, url: &str) -> Result<Vec<String>, FetchError> {
        self.ocr.convert(url).await
    }
}
