//! HTTP client for the transfer service API

use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use xfer_common::models::{ErrorBody, TransferResponse};
use xfer_common::{ProductVariant, TransferRequest};

const USER_AGENT: &str = concat!("xfer-cli/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Transfer service client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response; `message` is the server's `error` field when present
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for one transfer service instance
pub struct TransferClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl TransferClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Every non-bundle product variant
    pub async fn list_products(&self) -> Result<Vec<ProductVariant>, ClientError> {
        let url = self.url("/api/products");
        tracing::debug!(url = %url, "Fetching product list");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        read_json(response).await
    }

    /// Ranked search, as the form runs it for a row
    pub async fn search(&self, query: &str) -> Result<Vec<ProductVariant>, ClientError> {
        let url = self.url("/api/products/search");
        tracing::debug!(url = %url, query = %query, "Searching products");

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        read_json(response).await
    }

    /// Post a transfer request
    pub async fn submit(&self, request: &TransferRequest) -> Result<TransferResponse, ClientError> {
        let url = self.url("/api/transfer");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let accepted: TransferResponse = read_json(response).await?;
        tracing::info!(
            transfer_id = %accepted.transfer_doc.transfer_id,
            "Transfer request accepted"
        );
        Ok(accepted)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = TransferClient::new("http://localhost:3030/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3030");
        assert_eq!(client.url("/api/products"), "http://localhost:3030/api/products");
    }

    #[test]
    fn test_api_error_display() {
        let err = ClientError::Api {
            status: 400,
            message: "transferTo is required".to_string(),
        };
        assert_eq!(err.to_string(), "Server returned 400: transferTo is required");
    }
}
