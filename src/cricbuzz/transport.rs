//! Network seam for the API client.
//!
//! `ApiClient` only talks to the network through [`Transport`], so tests can
//! script responses and count calls without a live endpoint.

use crate::error::{CricketError, Result};
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single HTTP attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response body is not valid JSON: {0}")]
    Body(String),
}

impl TransportError {
    /// Whether another attempt may succeed. A body that fails to decode will
    /// decode the same way next time.
    pub fn is_transient(&self) -> bool {
        !matches!(self, TransportError::Body(_))
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one GET and decode the body as JSON.
    async fn get_json(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &HeaderMap,
    ) -> std::result::Result<Value, TransportError>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client whose every request is bounded by `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("cricbuzz-stats/0.1")
            .timeout(request_timeout)
            .build()
            .map_err(|e| CricketError::Config {
                message: format!("could not build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_json(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &HeaderMap,
    ) -> std::result::Result<Value, TransportError> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .query(query)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Body(e.to_string()))
    }
}

/// First 200 characters of a body, on one line.
fn preview(body: &str) -> String {
    body.chars()
        .take(200)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}
