//! Document retrieval
//!
//! Two ways of turning a URL into text: a plain HTTP GET of the body, and a
//! conversion of a hosted document (typically a PDF) into per-page markdown
//! through the document service.

mod http;
mod ocr;

pub use http::HttpFetcher;
pub use ocr::{OcrClient, DEFAULT_OCR_MODEL};

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("Failed to read body from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("Document conversion failed for {url}: {message}")]
    Conversion { url: String, message: String },
}

impl FetchError {
    fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Parse a candidate link, accepting only http(s)
pub fn parse_web_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
