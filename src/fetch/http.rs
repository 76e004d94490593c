//! Plain HTTP GET of a text body

use super::{parse_web_url, FetchError};
use reqwest::Client;
use std::time::Duration;

/// User-Agent string for outbound fetches
const USER_AGENT: &str = concat!("paper-assistant/", env!("CARGO_PKG_VERSION"));

/// Responses declaring a larger body are rejected unread
pub const MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;

/// Generic URL fetcher returning the decoded response body
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }

    pub async fn fetch_text(&self, raw_url: &str) -> Result<String, FetchError> {
        let url = parse_web_url(raw_url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(raw_url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: raw_url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length().filter(|&n| n > MAX_BODY_BYTES) {
            return Err(FetchError::Decode {
                url: raw_url.to_string(),
                message: format!("body of {length} bytes exceeds {MAX_BODY_BYTES}"),
            });
        }

        response.text().await.map_err(|e| FetchError::Decode {
            url: raw_url.to_string(),
            message: e.to_string(),
        })
    }
}
