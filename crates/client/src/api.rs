//! REST client for the image stack endpoint.
//!
//! Wraps `POST /tv/stack` using [`reqwest`]. The request timeout configured
//! here is the only latency bound in the system; the pipeline itself waits
//! for as long as the source does.

use std::time::Duration;

use async_trait::async_trait;
use wildcam_core::error::CoreError;
use wildcam_core::query::StackQuery;
use wildcam_core::stack::Stack;
use wildcam_pipeline::StackSource;

/// HTTP client for the image backend.
pub struct StackApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the stack REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum StackApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Stack API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body was not a list of stack images.
    #[error("Invalid stack payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<StackApiError> for CoreError {
    fn from(e: StackApiError) -> Self {
        CoreError::Retrieval(e.to_string())
    }
}

impl StackApi {
    /// Create a client for `api_url` whose requests give up after `timeout`.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:8000`.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, StackApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch the ordered image stack matching `query`.
    pub async fn get_image_stack(&self, query: &StackQuery) -> Result<Stack, StackApiError> {
        let response = self
            .client
            .post(format!("{}/tv/stack", self.api_url))
            .json(query)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, turning anything else
    /// into [`StackApiError::ApiError`] with the body text attached.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StackApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StackApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl StackSource for StackApi {
    async fn fetch_stack(&self, query: StackQuery) -> Result<Stack, CoreError> {
        let stack = self.get_image_stack(&query).await.map_err(|e| {
            tracing::error!(error = %e, url = %self.api_url, "Stack request failed");
            e
        })?;
        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = StackApi::with_client(reqwest::Client::new(), "http://host:8000/");
        assert_eq!(api.api_url(), "http://host:8000");
    }

    #[test]
    fn api_errors_become_opaque_retrieval_errors() {
        let err: CoreError = StackApiError::ApiError {
            status: 502,
            body: "bad gateway".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Retrieval(msg) if msg.contains("502")));
    }
}
