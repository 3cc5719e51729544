//! Submission of verification payloads to an HTTP endpoint

use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::Serialize;

/// Error type for submission failures
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Error marshaling payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Error sending request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned non-OK status: {status}, body: {body}")]
    Status { status: StatusCode, body: String },
}

/// Client for a verification endpoint accepting JSON payloads
#[derive(Debug, Clone)]
pub struct VerificationClient {
    url: String,
    http_client: Client,
}

impl VerificationClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_http_client(url, Client::new())
    }

    pub fn with_http_client(url: impl Into<String>, http_client: Client) -> Self {
        Self {
            url: url.into(),
            http_client,
        }
    }

    /// POSTs `payload` as JSON and returns the response body
    ///
    /// Anything but HTTP 200 is an error.
    pub async fn submit<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String, ApiError> {
        let body = serde_json::to_vec(payload)?;

        let response = self
            .http_client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(ApiError::Status { status, body });
        }

        tracing::info!("Verification API response: {}", body);
        Ok(body)
    }
}
