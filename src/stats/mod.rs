//! Stats module - report statistics and the keyword query heuristic

mod calculator;
pub mod query;

pub use calculator::{compute_report_statistics, ReportStatistics, StatsCalculator};
pub use query::{describe_query, generate_query_result, match_query, QueryAggregation};
