//! In-memory transport for engine tests

use crate::crawler::fetcher::{FetchResponse, Transport};
use crate::TransportError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Canned response for one URL
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    content_type: Option<String>,
    body: String,
    head_fails: bool,
    redirect_to: Option<String>,
}

impl Reply {
    /// A response with the given status and no body
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: Some("text/plain".to_string()),
            body: String::new(),
            head_fails: false,
            redirect_to: None,
        }
    }

    /// A 200 HTML page
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
            head_fails: false,
            redirect_to: None,
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// HEAD requests fail with a transport error; GET still answers
    pub fn head_fails(mut self) -> Self {
        self.head_fails = true;
        self
    }

    /// Reports `target` as the final URL, as if a redirect was followed
    pub fn redirected_to(mut self, target: &str) -> Self {
        self.redirect_to = Some(target.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Head,
    Get,
}

/// Whether a GET hands back the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Body {
    Skip,
    HtmlOnly,
}

/// [`Transport`] serving canned replies and recording every request
///
/// Unknown URLs fail with a connection error.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<(Method, String)>>,
    bodies_read: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, url: &str, reply: Reply) {
        self.routes.lock().unwrap().insert(url.to_string(), reply);
    }

    pub fn head_count(&self, url: &str) -> usize {
        self.count(Method::Head, url)
    }

    pub fn get_count(&self, url: &str) -> usize {
        self.count(Method::Get, url)
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every distinct URL that received at least one request
    pub fn requested_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, url)| url.clone())
            .collect();
        urls.sort();
        urls.dedup();
        urls
    }

    /// URLs whose body was handed to the caller
    pub fn bodies_read(&self) -> Vec<String> {
        self.bodies_read.lock().unwrap().clone()
    }

    fn count(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, u)| *m == method && u == url)
            .count()
    }

    async fn respond(
        &self,
        method: Method,
        url: &Url,
        body: Body,
    ) -> Result<FetchResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((method, url.as_str().to_string()));

        // Give other workers a chance to interleave
        tokio::task::yield_now().await;

        let reply = self.routes.lock().unwrap().get(url.as_str()).cloned();
        let reply = match reply {
            Some(reply) if !(method == Method::Head && reply.head_fails) => reply,
            _ => {
                return Err(TransportError::Connect {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                })
            }
        };

        let final_url = match &reply.redirect_to {
            Some(target) => Url::parse(target).map_err(|e| TransportError::Other {
                url: url.to_string(),
                message: e.to_string(),
            })?,
            None => url.clone(),
        };

        let mut response = FetchResponse {
            final_url,
            status: reply.status,
            content_type: reply.content_type,
            body: String::new(),
        };
        if method == Method::Get && body == Body::HtmlOnly && response.is_html() {
            self.bodies_read
                .lock()
                .unwrap()
                .push(url.as_str().to_string());
            response.body = reply.body;
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn head(&self, url: &Url, _timeout: Duration) -> Result<FetchResponse, TransportError> {
        self.respond(Method::Head, url, Body::Skip).await
    }

    async fn get(&self, url: &Url, _timeout: Duration) -> Result<FetchResponse, TransportError> {
        self.respond(Method::Get, url, Body::Skip).await
    }

    async fn get_page(
        &self,
        url: &Url,
        _timeout: Duration,
    ) -> Result<FetchResponse, TransportError> {
        self.respond(Method::Get, url, Body::HtmlOnly).await
    }
}
