//! Authenticated feed requests.
//!
//! `FeedConnection` owns the transport and the bearer token and turns feed
//! operations (fetch, query, insert, update, delete, batch) into single HTTP
//! exchanges. It performs no retries and keeps no cache.

use std::fmt;

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, IF_MATCH};
use reqwest::{Method, Request};
use url::Url;

use crate::auth::Credentials;
use crate::batch::{self, BatchResult};
use crate::entry::{Feed, FeedEntry};
use crate::error::{FeedError, Result};
use crate::transport::{FeedResponse, Transport};

/// Protocol version sent with every request.
pub const GDATA_VERSION: &str = "3.0";

const ATOM_CONTENT_TYPE: &str = "application/atom+xml";
const GDATA_VERSION_HEADER: HeaderName = HeaderName::from_static("gdata-version");

/// A session with the spreadsheet service.
#[derive(Clone)]
pub struct FeedConnection<T> {
    transport: T,
    token: String,
}

impl<T: fmt::Debug> fmt::Debug for FeedConnection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConnection")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> FeedConnection<T> {
    /// Wrap a transport with an already-obtained bearer token.
    pub fn new(transport: T, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
        }
    }

    /// Resolve `credentials` to a bearer token and build a connection.
    pub async fn authenticate(transport: T, credentials: &Credentials) -> Result<Self> {
        let token = credentials.bearer_token(&transport).await?;
        Ok(Self::new(transport, token))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn request(&self, method: Method, url: &str, query: &[(&str, &str)]) -> Result<Request> {
        let mut url = Url::parse(url)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let mut request = Request::new(method, url);
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| FeedError::Auth("bearer token is not a valid header value".into()))?;
        auth.set_sensitive(true);
        let headers = request.headers_mut();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(GDATA_VERSION_HEADER, HeaderValue::from_static(GDATA_VERSION));
        Ok(request)
    }

    fn with_body(mut request: Request, body: String) -> Request {
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(ATOM_CONTENT_TYPE));
        *request.body_mut() = Some(body.into());
        request
    }

    fn with_if_match(mut request: Request, version: &str) -> Result<Request> {
        let value = HeaderValue::from_str(version)
            .map_err(|_| FeedError::Malformed(format!("invalid entry version: {version:?}")))?;
        request.headers_mut().insert(IF_MATCH, value);
        Ok(request)
    }

    async fn execute(&self, request: Request) -> Result<FeedResponse> {
        let method = request.method().clone();
        let url = request.url().to_string();
        let response = self.transport.send(request).await?;
        tracing::debug!("{method} {url} -> {}", response.status);
        Ok(response)
    }

    fn decode_entry<E: FeedEntry>(response: FeedResponse) -> Result<Option<E>> {
        let response = response.error_for_status()?;
        if response.is_empty() {
            return Ok(None);
        }
        E::parse(&response.body).map(Some)
    }

    /// Fetch a single entry. A 404 or an empty body yields `None`.
    pub async fn get_entry<E: FeedEntry>(&self, url: &str) -> Result<Option<E>> {
        let request = self.request(Method::GET, url, &[])?;
        let response = self.execute(request).await?;
        if response.is_not_found() {
            return Ok(None);
        }
        Self::decode_entry(response)
    }

    /// Fetch a feed, optionally narrowed by query parameters.
    pub async fn get_feed<E: FeedEntry>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Feed<E>> {
        let request = self.request(Method::GET, url, query)?;
        let response = self.execute(request).await?.error_for_status()?;
        Feed::parse(&response.body)
    }

    /// POST a new entry into a feed and return what the service stored.
    pub async fn insert<E: FeedEntry>(&self, feed_url: &str, body: String) -> Result<Option<E>> {
        let request = Self::with_body(self.request(Method::POST, feed_url, &[])?, body);
        let response = self.execute(request).await?;
        Self::decode_entry(response)
    }

    /// PUT a replacement entry at its edit URL.
    ///
    /// `if_match` is the entry version to check against; `None` sends `*`.
    pub async fn update<E: FeedEntry>(
        &self,
        edit_url: &str,
        body: String,
        if_match: Option<&str>,
    ) -> Result<Option<E>> {
        let request = Self::with_body(self.request(Method::PUT, edit_url, &[])?, body);
        let request = Self::with_if_match(request, if_match.unwrap_or("*"))?;
        let response = self.execute(request).await?;
        Self::decode_entry(response)
    }

    /// DELETE an entry at its edit URL.
    pub async fn delete(&self, edit_url: &str, if_match: Option<&str>) -> Result<()> {
        let request = self.request(Method::DELETE, edit_url, &[])?;
        let request = Self::with_if_match(request, if_match.unwrap_or("*"))?;
        self.execute(request).await?.error_for_status()?;
        Ok(())
    }

    /// Submit a batch feed. The write is unconditional (`If-Match: *`).
    pub async fn batch(&self, batch_url: &str, body: String) -> Result<Vec<BatchResult>> {
        let request = Self::with_body(self.request(Method::POST, batch_url, &[])?, body);
        let request = Self::with_if_match(request, "*")?;
        let response = self.execute(request).await?.error_for_status()?;
        batch::parse_batch_response(&response.body)
    }
}
