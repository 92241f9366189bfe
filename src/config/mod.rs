//! Configuration module for deadlink-scraper
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every section is optional; command-line flags override file values.
//!
//! # Example
//!
//! ```no_run
//! use deadlink_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("deadlink.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_MS,
};

// Re-export parser functions
pub use parser::{load_config, parse_config, parse_duration};
pub use validation::validate;
