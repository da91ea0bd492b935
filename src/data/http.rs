//! HTTP capability used by the remote feed loader
//!
//! The loader only depends on the `HttpClient` trait. `ReqwestHttpClient` is
//! the production implementation backed by a shared `reqwest::Client`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Errors raised when a request never produced a response
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Transport failed for a reason outside reqwest
    #[error("Transport error: {0}")]
    Transport(String),
}

/// A response as seen by the feed loader: status code plus raw body bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response from a status code and body
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs GET requests on behalf of the remote loader
///
/// Each call issues exactly one request and resolves exactly once. Timeouts
/// are the implementation's concern.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issues a GET request for `url`
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError>;
}

/// `HttpClient` backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestHttpClient {
    /// Create a new client with reqwest's default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a new client with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Create a new client whose requests give up after `timeout`
    ///
    /// # Returns
    /// * `Ok(ReqwestHttpClient)` on success
    /// * `Err(HttpClientError)` if the TLS backend cannot be initialised
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpClientError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
