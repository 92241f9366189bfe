//! HTTP transport implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent
//! - HEAD requests used for cheap liveness checks
//! - GET requests used as the liveness fallback (body never read)
//! - Page fetches, which read the body only for HTML documents
//! - Error classification (timeout / connection / other)
//!
//! The crawler only talks to the network through the [`Transport`] trait,
//! so tests can substitute an in-memory implementation.

use crate::config::UserAgentConfig;
use crate::TransportError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use url::Url;

/// Response returned by a [`Transport`]
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Response body (only filled by [`Transport::get_page`] for HTML)
    pub body: String,
}

impl FetchResponse {
    /// Returns true if the Content-Type denotes an HTML document
    pub fn is_html(&self) -> bool {
        self.content_type.as_deref().is_some_and(is_html_content_type)
    }
}

/// Network access used by the crawl engine
///
/// Implementations follow redirects on their own and report the final URL.
/// A returned `Err` means no HTTP response was obtained at all.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends a HEAD request
    async fn head(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, TransportError>;

    /// Sends a GET request without reading the body
    async fn get(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, TransportError>;

    /// Sends a GET request and reads the body if the response is HTML
    ///
    /// Any other content type is returned with an empty body, so large
    /// downloads are dropped after the headers.
    async fn get_page(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a transport with a client configured from `config`
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }

    async fn send(
        &self,
        request: RequestBuilder,
        url: &Url,
        timeout: Duration,
    ) -> Result<Response, TransportError> {
        request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn head(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, TransportError> {
        let response = self.send(self.client.head(url.clone()), url, timeout).await?;
        Ok(fetch_response_head(&response))
    }

    async fn get(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, TransportError> {
        // The response is dropped unread, closing the connection mid-body
        let response = self.send(self.client.get(url.clone()), url, timeout).await?;
        Ok(fetch_response_head(&response))
    }

    async fn get_page(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> Result<FetchResponse, TransportError> {
        let response = self.send(self.client.get(url.clone()), url, timeout).await?;
        let mut page = fetch_response_head(&response);

        // Check Content-Type before downloading the body
        if page.is_html() {
            page.body = response
                .text()
                .await
                .map_err(|e| classify_error(url, e))?;
        }

        Ok(page)
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects follow reqwest's default policy (up to 10 hops). Timeouts are
/// applied per request rather than on the client.
///
/// # Example
///
/// ```no_run
/// use deadlink_scraper::config::UserAgentConfig;
/// use deadlink_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if the Content-Type value denotes an HTML document
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Status line and headers of a response, with an empty body
fn fetch_response_head(response: &Response) -> FetchResponse {
    FetchResponse {
        final_url: response.url().clone(),
        status: response.status().as_u16(),
        content_type: header_content_type(response),
        body: String::new(),
    }
}

fn header_content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn classify_error(url: &Url, error: reqwest::Error) -> TransportError {
    let url = url.to_string();
    if error.is_timeout() {
        TransportError::Timeout { url }
    } else if error.is_connect() {
        TransportError::Connect {
            url,
            message: error.to_string(),
        }
    } else {
        TransportError::Other {
            url,
            message: error.to_string(),
        }
    }
}
