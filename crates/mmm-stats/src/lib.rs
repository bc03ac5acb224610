//! mmm-stats: solved-challenge statistics.
//!
//! Appends one CSV row per solved challenge and reads the log back into
//! per-challenge summaries.

pub mod csv_log;
pub mod summary;

pub use csv_log::{CsvStatsLog, CSV_HEADER};
pub use summary::{read_stats, render_table, summarize, ChallengeSummary, StatsRow};
