//! State module for tracking crawl progress
//!
//! This module provides the state shared by every worker of a crawl session.
//!
//! # Components
//!
//! - `DedupSet`: Set of canonical URLs with atomic check-and-insert, used for
//!   both the visited (scheduled) and checked (validated) sets
//! - `StatsAggregator`: Counters updated once per unique link
//! - `LinkStats`: Plain snapshot of those counters

mod dedup_set;
mod link_stats;

// Re-export main types
pub use dedup_set::DedupSet;
pub use link_stats::{LinkStats, StatsAggregator};
