//! HTTP transport for backend requests.

use super::error::{ExchangeError, rejection_reason};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::warn;

/// Thin JSON-over-HTTP client. One attempt per call, no retries.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, connect_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        let base_url: String = base_url.into();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_headers(token: &str) -> Result<HeaderMap, ExchangeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // A token that cannot be sent is as good as none
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ExchangeError::Unauthenticated)?;
        headers.insert(AUTHORIZATION, value);

        Ok(headers)
    }

    /// POST a JSON body with a bearer token and deserialize the response.
    pub async fn post_json<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<R, ExchangeError> {
        let url = format!("{}{path}", self.base_url);
        let headers = Self::build_headers(token)?;

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| ExchangeError::Unreachable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ExchangeError::Unreachable(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ExchangeError::Unauthenticated);
        }
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), body = %text, "Backend rejected request");
            return Err(ExchangeError::Rejected(rejection_reason(
                status.as_u16(),
                &text,
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!(%url, error = %e, body = %text, "Malformed backend response");
            ExchangeError::Rejected("Malformed response from server".to_string())
        })
    }
}
