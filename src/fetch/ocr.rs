//! Document-to-markdown conversion through the hosted OCR endpoint

use super::{parse_web_url, FetchError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OCR_MODEL: &str = "mistral-ocr-latest";

/// Client for the document conversion service
#[derive(Clone)]
pub struct OcrClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OcrClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: format!("{}/v1/ocr", base_url.trim_end_matches('/')),
        })
    }

    /// Convert the document at `raw_url` into page texts, in page order
    pub async fn convert(&self, raw_url: &str) -> Result<Vec<String>, FetchError> {
        let url = parse_web_url(raw_url)?;

        let request = OcrRequest {
            model: &self.model,
            document: OcrDocument {
                kind: "document_url",
                document_url: url.as_str(),
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(raw_url, &e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::Decode {
            url: raw_url.to_string(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(FetchError::Conversion {
                url: raw_url.to_string(),
                message: format!("HTTP {status}: {body}"),
            });
        }

        parse_pages(raw_url, &body)
    }
}

fn parse_pages(url: &str, body: &str) -> Result<Vec<String>, FetchError> {
    let mut response: OcrResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Conversion {
            url: url.to_string(),
            message: format!("Failed to parse response: {e}"),
        })?;

    response.pages.sort_by_key(|p| p.index);
    Ok(response.pages.into_iter().map(|p| p.markdown).collect())
}

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: OcrDocument<'a>,
}

#[derive(Debug, Serialize)]
struct OcrDocument<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    document_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    pages: Vec<OcrPage>,
}

#[derive(Debug, Deserialize)]
struct OcrPage {
    index: u32,
    #[serde(default)]
    markdown: String,
}
