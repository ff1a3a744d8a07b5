//! HTTP transport for feed requests.
//!
//! Every feed operation is a single request/response exchange. The
//! [`Transport`] trait is the seam between the protocol code and the network:
//! production code uses [`ReqwestTransport`], tests substitute an in-memory
//! fake that records requests and serves canned responses.

use std::future::Future;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Request, StatusCode};

use crate::error::{FeedError, Result};

/// A fully buffered response from the spreadsheet service.
#[derive(Debug, Clone)]
pub struct FeedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FeedResponse {
    /// Create a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// True when the body carries no document at all (only whitespace).
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(|b| b.is_ascii_whitespace())
    }

    /// The body decoded as UTF-8.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| FeedError::Malformed(format!("response body is not UTF-8: {e}")))
    }

    /// Convert a non-2xx response into a [`FeedError::Status`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(FeedError::Status {
            status: self.status.as_u16(),
            body: String::from_utf8_lossy(&self.body).into_owned(),
        })
    }
}

/// Sends one HTTP request and buffers the whole response.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> impl Future<Output = Result<FeedResponse>> + Send;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing client (custom timeouts, proxies, user agent).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<FeedResponse> {
        tracing::debug!("{} {}", request.method(), request.url());
        let response = self.client.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(FeedResponse {
            status,
            headers,
            body,
        })
    }
}
