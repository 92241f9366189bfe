//! Link liveness checks
//!
//! A link is checked with a HEAD request first. If the HEAD request does not
//! complete at all, a single GET is sent instead. There are no other retries.

use crate::crawler::fetcher::Transport;
use crate::url::Link;
use crate::TransportError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Why a link was judged dead
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadReason {
    /// The server answered with a status of 400 or above
    Status(u16),
    /// Neither HEAD nor GET produced a response
    Transport(TransportError),
}

impl fmt::Display for DeadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "HTTP {}", status),
            Self::Transport(e) => write!(f, "{}", e),
        }
    }
}

/// Result of checking one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Answered with a status below 400
    Alive(u16),
    Dead(DeadReason),
    /// Not checked over the network (anchors, ignored links)
    Skipped,
}

impl Outcome {
    /// Classifies a received status code
    pub fn from_status(status: u16) -> Self {
        if status >= 400 {
            Self::Dead(DeadReason::Status(status))
        } else {
            Self::Alive(status)
        }
    }

    /// The HTTP status, if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Alive(status) | Self::Dead(DeadReason::Status(status)) => Some(*status),
            Self::Dead(DeadReason::Transport(_)) | Self::Skipped => None,
        }
    }
}

/// Checks links over a [`Transport`]
pub struct Validator<T> {
    transport: Arc<T>,
    timeout: Duration,
}

impl<T: Transport> Validator<T> {
    pub fn new(transport: Arc<T>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Checks a classified link
    ///
    /// Anchors and ignored links are skipped without a network call.
    pub async fn validate(&self, link: &Link) -> Outcome {
        if !link.kind.needs_network_check() {
            tracing::debug!("[SKIP]   {} ({})", link.url, link.kind);
            return Outcome::Skipped;
        }

        let url = match Url::parse(&link.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("[DEAD]   {} (unparseable: {})", link.url, e);
                return Outcome::Dead(DeadReason::Transport(TransportError::Other {
                    url: link.url.clone(),
                    message: e.to_string(),
                }));
            }
        };

        let outcome = self.check_url(&url).await;
        match &outcome {
            Outcome::Alive(status) => tracing::info!("[ALIVE]  {} ({})", link.url, status),
            Outcome::Dead(DeadReason::Status(status)) => {
                tracing::warn!("[DEAD]   {} ({})", link.url, status)
            }
            Outcome::Dead(DeadReason::Transport(e)) => {
                tracing::warn!("[DEAD]   {} ({})", link.url, e)
            }
            Outcome::Skipped => {}
        }
        outcome
    }

    /// Sends HEAD, falling back to one GET if HEAD fails to complete
    pub async fn check_url(&self, url: &Url) -> Outcome {
        match self.transport.head(url, self.timeout).await {
            Ok(response) => return Outcome::from_status(response.status),
            Err(e) => tracing::debug!("HEAD failed for {}, retrying with GET: {}", url, e),
        }

        match self.transport.get(url, self.timeout).await {
            Ok(response) => Outcome::from_status(response.status),
            Err(e) => Outcome::Dead(DeadReason::Transport(e)),
        }
    }
}
