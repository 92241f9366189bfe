//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the worker pool that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier with the start URL
//! - Running a fixed number of concurrent workers
//! - Checking every unique link exactly once
//! - Feeding newly discovered internal links back into the frontier
//! - Shutting down once no work remains and reporting the results

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Transport;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::extract_links;
use crate::crawler::validator::{DeadReason, Outcome, Validator};
use crate::state::{DedupSet, LinkStats, StatsAggregator};
use crate::url::{normalize, same_host, Link, LinkKind};
use crate::{Result, ScraperError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};
use url::Url;

/// How often (in crawled pages) progress is logged
const PROGRESS_INTERVAL: usize = 10;

/// Tunables of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Number of concurrent workers
    pub concurrency: usize,
    /// Timeout of every HEAD and GET request
    pub timeout: Duration,
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            timeout: config.timeout(),
        }
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

/// A link found dead during the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLink {
    pub link: Link,
    pub reason: DeadReason,
}

/// Final results of a crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Canonical seed URL
    pub seed: Url,
    pub stats: LinkStats,
    /// Links scheduled for crawling (seed, internal pages, anchors)
    pub visited: Vec<Link>,
    /// Links whose liveness was accounted for
    pub checked: Vec<Link>,
    /// Dead links sorted by URL
    pub dead_links: Vec<DeadLink>,
    /// Pages fetched and parsed for links
    pub pages_crawled: usize,
    pub elapsed: Duration,
}

/// Main crawler coordinator structure
///
/// Every call to [`Coordinator::run`] creates a fresh session, so one
/// coordinator can run several crawls, concurrently or not.
pub struct Coordinator<T> {
    transport: Arc<T>,
    options: CrawlOptions,
}

impl<T: Transport> Coordinator<T> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `transport` - Network access used for checks and page fetches
    /// * `options` - Worker count and request timeout
    pub fn new(transport: T, options: CrawlOptions) -> Self {
        Self::with_shared_transport(Arc::new(transport), options)
    }

    /// Creates a coordinator around an already shared transport
    pub fn with_shared_transport(transport: Arc<T>, options: CrawlOptions) -> Self {
        Self { transport, options }
    }

    /// Runs a complete crawl from `seed`
    ///
    /// This method:
    /// 1. Parses and canonicalizes the seed (fatal on failure)
    /// 2. Marks the seed visited and checked
    /// 3. Starts the workers and queues the seed
    /// 4. Starts the shutdown watcher, which closes the frontier once the
    ///    pending counter reaches zero
    /// 5. Waits for every worker to drain and exit
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Crawl ran to completion
    /// * `Err(ScraperError)` - Invalid seed, or a worker task panicked
    pub async fn run(&self, seed: &str) -> Result<CrawlReport> {
        let seed = parse_seed(seed)?;
        let concurrency = self.options.concurrency.max(1);
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl of {} with {} workers (timeout {:?})",
            seed,
            concurrency,
            self.options.timeout
        );

        let session = Arc::new(CrawlSession::new(
            Arc::clone(&self.transport),
            seed.clone(),
            self.options.timeout,
        ));

        // The seed is the crawl root, not a discovered link: it is never
        // counted in the statistics.
        let root = Link::new(seed.as_str(), LinkKind::Internal);
        session.visited.try_add(&root);
        session.checked.try_add(&root);

        let workers: Vec<_> = (0..concurrency)
            .map(|id| tokio::spawn(run_worker(id, Arc::clone(&session))))
            .collect();

        session.frontier.enqueue(root);

        let watcher = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.frontier.close_when_idle().await })
        };

        for worker in workers {
            worker.await?;
        }
        watcher.await?;

        let report = CrawlReport {
            seed,
            stats: session.stats.snapshot(),
            visited: session.visited.links(),
            checked: session.checked.links(),
            dead_links: session.dead_links(),
            pages_crawled: session.pages_crawled.load(Ordering::Relaxed),
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            "Crawl completed: {} links checked, {} pages crawled in {:?}",
            report.stats.total,
            report.pages_crawled,
            report.elapsed
        );

        Ok(report)
    }
}

/// Parses the seed URL, assuming https when no scheme is given
///
/// # Returns
///
/// * `Ok(Url)` - Canonical seed URL
/// * `Err(ScraperError::InvalidSeed)` - No crawl can start from this input
pub fn parse_seed(seed: &str) -> Result<Url> {
    let invalid = |reason: String| ScraperError::InvalidSeed {
        url: seed.to_string(),
        reason,
    };

    let trimmed = seed.trim();
    let parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(::url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", trimmed)).map_err(|e| invalid(e.to_string()))?
        }
        Err(e) => return Err(invalid(e.to_string())),
    };

    normalize(&parsed, parsed.as_str()).map_err(|e| invalid(e.to_string()))
}

/// State owned by one crawl and shared by its workers
struct CrawlSession<T> {
    transport: Arc<T>,
    validator: Validator<T>,
    timeout: Duration,
    seed: Url,
    /// Host the crawl stays on, taken from the seed page after redirects
    site: OnceLock<Url>,
    visited: DedupSet,
    checked: DedupSet,
    /// Canonical URLs of the documents parsed so far
    crawled: DedupSet,
    stats: StatsAggregator,
    frontier: Frontier,
    dead_links: Mutex<Vec<DeadLink>>,
    pages_crawled: AtomicUsize,
}

/// A fetched HTML page ready for link extraction
struct Page {
    base: Url,
    body: String,
}

impl<T: Transport> CrawlSession<T> {
    fn new(transport: Arc<T>, seed: Url, timeout: Duration) -> Self {
        Self {
            validator: Validator::new(Arc::clone(&transport), timeout),
            transport,
            timeout,
            seed,
            site: OnceLock::new(),
            visited: DedupSet::new(),
            checked: DedupSet::new(),
            crawled: DedupSet::new(),
            stats: StatsAggregator::new(),
            frontier: Frontier::new(),
            dead_links: Mutex::new(Vec::new()),
            pages_crawled: AtomicUsize::new(0),
        }
    }

    /// Processes one job taken from the frontier
    ///
    /// Children are enqueued before this returns, while the caller still
    /// holds the job guard.
    async fn process(&self, job: &Link) {
        self.check_once(job).await;

        if job.kind != LinkKind::Internal {
            return;
        }

        let Some(page) = self.fetch_page(job).await else {
            return;
        };

        let links = extract_links(&page.body, &page.base);
        tracing::debug!("Found {} links on {}", links.len(), page.base);

        for link in links {
            if link.kind.is_schedulable() {
                if self.visited.try_add(&link) {
                    tracing::trace!("Queueing {}", link.url);
                    self.frontier.enqueue(link);
                }
            } else if link.kind == LinkKind::External {
                self.check_once(&link).await;
            }
        }

        let crawled = self.pages_crawled.fetch_add(1, Ordering::Relaxed) + 1;
        if crawled % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} pages crawled, {} queued, {} links checked",
                crawled,
                self.frontier.queued(),
                self.checked.len()
            );
        }
    }

    /// Checks the link and records it, unless another worker already did
    async fn check_once(&self, link: &Link) {
        if self.checked.try_add(link) {
            let outcome = self.validator.validate(link).await;
            self.stats.record(link, &outcome);

            if let Outcome::Dead(reason) = outcome {
                self.dead_links
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(DeadLink {
                        link: link.clone(),
                        reason,
                    });
            }
        }
    }

    fn dead_links(&self) -> Vec<DeadLink> {
        let mut dead = self
            .dead_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        dead.sort_by(|a, b| a.link.url.cmp(&b.link.url));
        dead
    }

    /// Fetches an internal page for link extraction
    ///
    /// Returns `None` (after logging) when the page cannot be fetched, is not
    /// HTML, was redirected off the crawled host, or is a document already
    /// parsed under another URL.
    async fn fetch_page(&self, job: &Link) -> Option<Page> {
        let is_seed = job.url == self.seed.as_str();

        if self.crawled.contains(&job.url) {
            tracing::debug!("Not crawling {} (already crawled)", job.url);
            return None;
        }

        let url = match Url::parse(&job.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot crawl {}: {}", job.url, e);
                return None;
            }
        };

        let response = match self.transport.get_page(&url, self.timeout).await {
            Ok(response) => response,
            Err(e) if is_seed => {
                tracing::error!("Failed to fetch seed page {}: {}", job.url, e);
                return None;
            }
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", job.url, e);
                return None;
            }
        };

        if !response.is_html() {
            tracing::debug!(
                "Not crawling {} (content type {:?})",
                job.url,
                response.content_type
            );
            return None;
        }

        if is_seed {
            let site = self.site.get_or_init(|| response.final_url.clone());
            if !same_host(site, &self.seed) {
                tracing::info!("Seed redirected to {}, crawling that host", site);
            }
        } else {
            let site = self.site.get().unwrap_or(&self.seed);
            if !same_host(&response.final_url, site) {
                tracing::debug!(
                    "Not crawling {} (redirected off-site to {})",
                    job.url,
                    response.final_url
                );
                return None;
            }
        }

        let canonical = normalize(&response.final_url, response.final_url.as_str())
            .map(String::from)
            .unwrap_or_else(|_| job.url.clone());
        if !self.crawled.try_add(&Link::new(canonical.as_str(), LinkKind::Internal)) {
            tracing::debug!("Not crawling {} (already crawled as {})", job.url, canonical);
            return None;
        }

        let mut base = response.final_url;
        base.set_fragment(None);

        Some(Page {
            base,
            body: response.body,
        })
    }
}

/// Worker loop: take jobs until the frontier is closed and drained
async fn run_worker<T: Transport>(id: usize, session: Arc<CrawlSession<T>>) -> usize {
    let mut processed = 0;

    while let Some(job) = session.frontier.next_job().await {
        let _guard = session.frontier.begin_job();
        tracing::trace!("Worker {} crawling {}", id, job.url);
        session.process(&job).await;
        processed += 1;
    }

    tracing::debug!("Worker {} exiting after {} jobs", id, processed);
    processed
}
