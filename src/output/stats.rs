//! Terminal summary of a finished crawl
//!
//! This module formats the link statistics, the status code distribution
//! and the list of dead links for display on stdout.

use crate::crawler::CrawlReport;
use crate::state::LinkStats;
use std::io::{self, Write};

/// Prints the crawl summary to stdout
///
/// # Arguments
///
/// * `report` - The finished crawl
pub fn print_report(report: &CrawlReport) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_report(report, &mut out) {
        tracing::error!("Failed to print crawl summary: {}", e);
    }
}

/// Writes the crawl summary to any writer
pub fn write_report<W: Write>(report: &CrawlReport, out: &mut W) -> io::Result<()> {
    let stats = &report.stats;

    writeln!(out, "=== Scan complete: {} ===\n", report.seed)?;

    writeln!(out, "Links:")?;
    writeln!(out, "  Total:    {}", stats.total)?;
    writeln!(out, "  Internal: {}", stats.internal)?;
    writeln!(out, "  External: {}", stats.external)?;
    writeln!(out, "  Alive:    {}", stats.alive)?;
    writeln!(out, "  Dead:     {}", stats.dead)?;
    writeln!(out, "  Skipped:  {}", stats.skipped)?;
    writeln!(out)?;

    if !stats.by_status_code.is_empty() {
        writeln!(out, "Status codes distribution:")?;
        for (code, count, percentage) in status_distribution(stats) {
            writeln!(out, "  {}: {} ({:.1}%)", code, count, percentage)?;
        }
        writeln!(out)?;
    }

    if !report.dead_links.is_empty() {
        writeln!(out, "Dead links ({}):", report.dead_links.len())?;
        for dead in &report.dead_links {
            writeln!(out, "  - {} [{}] {}", dead.link.url, dead.link.kind, dead.reason)?;
        }
        writeln!(out)?;
    }

    writeln!(
        out,
        "Alive Rate: {:.1}% ({} pages crawled in {:.2}s)",
        stats.alive_rate(),
        report.pages_crawled,
        report.elapsed.as_secs_f64()
    )?;

    Ok(())
}

/// Status codes with their count and share of all responses
///
/// Ordered by count (descending), then by code.
pub fn status_distribution(stats: &LinkStats) -> Vec<(String, u64, f64)> {
    let responses: u64 = stats.by_status_code.values().sum();

    let mut codes: Vec<_> = stats
        .by_status_code
        .iter()
        .map(|(code, count)| {
            let percentage = if responses > 0 {
                (*count as f64 / responses as f64) * 100.0
            } else {
                0.0
            };
            (code.clone(), *count, percentage)
        })
        .collect();
    // Stable sort keeps the BTreeMap's code order for equal counts
    codes.sort_by(|a, b| b.1.cmp(&a.1));
    codes
}
