//! Crawler module for link checking and page traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP access behind the [`Transport`] trait
//! - HEAD-then-GET liveness checks
//! - HTML parsing and link extraction
//! - The job frontier and termination detection
//! - Overall crawl coordination across a worker pool

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod validator;

#[cfg(test)]
mod testing;

pub use coordinator::{parse_seed, Coordinator, CrawlOptions, CrawlReport, DeadLink};
pub use fetcher::{
    build_http_client, is_html_content_type, FetchResponse, ReqwestTransport, Transport,
};
pub use frontier::{Frontier, JobGuard, TaskTracker};
pub use parser::{extract_hrefs, extract_links};
pub use validator::{DeadReason, Outcome, Validator};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl over the network
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client with the configured user agent
/// 2. Start the worker pool from the seed URL
/// 3. Check every discovered link once and follow internal pages
/// 4. Return the final statistics once no work remains
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The start URL; `https://` is assumed when no scheme is given
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(ScraperError)` - Invalid seed or HTTP client setup failure
pub async fn crawl(config: &Config, seed: &str) -> Result<CrawlReport> {
    let transport = ReqwestTransport::from_config(&config.user_agent)?;
    let coordinator = Coordinator::new(transport, CrawlOptions::from(&config.crawler));
    coordinator.run(seed).await
}
