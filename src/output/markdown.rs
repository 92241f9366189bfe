//! Markdown report generation
//!
//! This module generates a human-readable markdown report of a crawl,
//! including link statistics, the status code distribution and every dead
//! link found.

use crate::crawler::{CrawlReport, DeadReason};
use crate::output::stats::status_distribution;
use crate::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report of a crawl to a file
///
/// # Arguments
///
/// * `report` - The finished crawl
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(ScraperError::Io)` - Failed to write the report
pub fn generate_markdown_report(report: &CrawlReport, output_path: &Path) -> Result<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Report written to {}", output_path.display());
    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Dead Link Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Pages Crawled**: {}\n", report.pages_crawled));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n\n",
        report.elapsed.as_secs_f64()
    ));

    md.push_str("## Link Statistics\n\n");
    md.push_str("| Category | Count |\n");
    md.push_str("|----------|-------|\n");
    md.push_str(&format!("| Total | {} |\n", stats.total));
    md.push_str(&format!("| Internal | {} |\n", stats.internal));
    md.push_str(&format!("| External | {} |\n", stats.external));
    md.push_str(&format!("| Alive | {} |\n", stats.alive));
    md.push_str(&format!("| Dead | {} |\n", stats.dead));
    md.push_str(&format!("| Skipped | {} |\n\n", stats.skipped));
    md.push_str(&format!("- **Alive Rate**: {:.2}%\n\n", stats.alive_rate()));

    if !stats.by_status_code.is_empty() {
        md.push_str("## Status Codes\n\n");
        md.push_str("| Status | Count | Share |\n");
        md.push_str("|--------|-------|-------|\n");
        for (code, count, percentage) in status_distribution(stats) {
            md.push_str(&format!("| {} | {} | {:.1}% |\n", code, count, percentage));
        }
        md.push('\n');
    }

    md.push_str("## Dead Links\n\n");
    if report.dead_links.is_empty() {
        md.push_str("No dead links found.\n");
    } else {
        md.push_str("| URL | Kind | Reason |\n");
        md.push_str("|-----|------|--------|\n");
        for dead in &report.dead_links {
            let reason = match &dead.reason {
                DeadReason::Status(status) => status.to_string(),
                DeadReason::Transport(e) => escape_cell(&e.to_string()),
            };
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&dead.link.url),
                dead.link.kind,
                reason
            ));
        }
    }

    md
}

/// Keeps a value from breaking the table layout
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
