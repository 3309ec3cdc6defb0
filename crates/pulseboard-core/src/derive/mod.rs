//! Metric derivation engine.
//!
//! Pure functions from raw record sets to the view models the dashboard
//! renders. Nothing here performs I/O or keeps state, and nothing fails on
//! empty input: missing data yields zero-valued or empty results.

pub mod audience;
pub mod breakdown;
pub mod distribution;
pub mod estimates;
pub mod growth;
pub mod series;
pub mod stats;
pub mod tier;
pub mod trend;

pub use distribution::{metric_distribution, DistributionSlice};
pub use growth::{overall_growth, revenue_growth, sequential_growth};
pub use series::{
    campaign_bars, compact_campaign_bars, revenue_series, truncate_label, BarPoint,
    ChartSeriesPoint,
};
pub use stats::{monthly_buckets, summarize, top_n, MonthlyBucket, Summary};
pub use tier::{tier_distribution, PerformanceTier, TierCount};
pub use trend::{metric_trends, Direction, MetricTrends, TrendIndicator};
