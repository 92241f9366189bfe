use crate::crawler::Outcome;
use crate::url::{Link, LinkKind};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Aggregate link statistics for a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Number of unique links accounted for
    pub total: u64,

    /// Links on the crawled host
    pub internal: u64,

    /// Links to other hosts
    pub external: u64,

    /// Links that answered with a status below 400
    pub alive: u64,

    /// Links that answered with 400+ or never answered
    pub dead: u64,

    /// Anchors and other links counted without a network check
    pub skipped: u64,

    /// Occurrences of each HTTP status code, keyed by the code as a string
    pub by_status_code: BTreeMap<String, u64>,
}

impl LinkStats {
    /// Percentage of network-checked links that were alive
    pub fn alive_rate(&self) -> f64 {
        let checked = self.alive + self.dead;
        if checked == 0 {
            return 0.0;
        }
        (self.alive as f64 / checked as f64) * 100.0
    }
}

/// Concurrency-safe wrapper around [`LinkStats`]
///
/// Owned by one crawl session and shared by all of its workers.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: Mutex<LinkStats>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the check result for one unique link
    ///
    /// Counts the link in `total` and in exactly one of internal/external,
    /// then in exactly one of alive/dead/skipped. Anchors and ignored links
    /// only count as skipped. A numeric status, when there is one, is added
    /// to the status code distribution.
    pub fn record(&self, link: &Link, outcome: &Outcome) {
        let mut stats = self.lock();
        stats.total += 1;

        match link.kind {
            LinkKind::Internal => stats.internal += 1,
            LinkKind::External => stats.external += 1,
            LinkKind::PageAnchor | LinkKind::Ignored => {
                stats.skipped += 1;
                return;
            }
        }

        match outcome {
            Outcome::Alive(_) => stats.alive += 1,
            Outcome::Dead(_) => stats.dead += 1,
            Outcome::Skipped => stats.skipped += 1,
        }

        if let Some(status) = outcome.status_code() {
            *stats.by_status_code.entry(status.to_string()).or_insert(0) += 1;
        }
    }

    /// Returns a copy of the current counters
    pub fn snapshot(&self) -> LinkStats {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, LinkStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
