//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - Printing the crawl summary to stdout
//! - Generating markdown reports of crawl results

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use stats::{print_report, status_distribution, write_report};
