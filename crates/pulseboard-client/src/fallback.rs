//! Synthetic records served when the backend is unavailable.
//!
//! Shapes are fixed (counts, campaign names, date spacing); values are
//! random within the ranges real data is expected to fall in. Every id is
//! prefixed `mock-` so synthetic records are recognizable downstream.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pulseboard_core::metrics::{CampaignConversion, HealthStatus, OverviewMetrics, RevenueDataPoint};

/// Points in a synthetic history series.
pub const HISTORY_POINTS: usize = 30;

pub const MOCK_CAMPAIGNS: [&str; 5] = [
    "Facebook Ads",
    "Google Ads",
    "Email Marketing",
    "Social Media",
    "Influencer Marketing",
];

pub const MOCK_HEALTH_STATUS: &str = "mock-healthy";

pub struct SyntheticSource<R> {
    rng: R,
}

impl SyntheticSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic values, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SyntheticSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn snapshot(&mut self, id: String, date: DateTime<Utc>) -> OverviewMetrics {
        OverviewMetrics {
            id,
            revenue: self.rng.gen_range(50_000..150_000) as f64,
            users: self.rng.gen_range(5_000..15_000),
            conversions: self.rng.gen_range(500..1_500),
            growth: self.rng.gen_range(-10.0..10.0),
            date,
        }
    }

    pub fn overview(&mut self, now: DateTime<Utc>) -> OverviewMetrics {
        self.snapshot(format!("mock-{}", now.timestamp_millis()), now)
    }

    /// `count` daily snapshots, oldest first, the last one dated `now`.
    pub fn overview_history(&mut self, now: DateTime<Utc>, count: usize) -> Vec<OverviewMetrics> {
        (0..count)
            .map(|i| {
                let id = format!("mock-{}-{i}", now.timestamp_millis());
                self.snapshot(id, series_date(now, count, i))
            })
            .collect()
    }

    pub fn campaigns(&mut self, now: DateTime<Utc>) -> Vec<CampaignConversion> {
        MOCK_CAMPAIGNS
            .iter()
            .enumerate()
            .map(|(i, name)| CampaignConversion {
                id: format!("mock-campaign-{}-{i}", now.timestamp_millis()),
                campaign: name.to_string(),
                conversions: self.rng.gen_range(100..600),
                date: now,
            })
            .collect()
    }

    pub fn revenue(&mut self, now: DateTime<Utc>, count: usize) -> Vec<RevenueDataPoint> {
        (0..count)
            .map(|i| RevenueDataPoint {
                id: format!("mock-revenue-{}-{i}", now.timestamp_millis()),
                date: series_date(now, count, i),
                revenue: self.rng.gen_range(25_000..75_000) as f64,
                source: None,
                region: None,
            })
            .collect()
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: MOCK_HEALTH_STATUS.to_string(),
        }
    }
}

fn series_date(now: DateTime<Utc>, count: usize, index: usize) -> DateTime<Utc> {
    now - Duration::days((count - 1 - index) as i64)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn overview_values_stay_in_range() {
        let mut source = SyntheticSource::seeded(7);
        for m in source.overview_history(now(), 200) {
            assert!((50_000.0..150_000.0).contains(&m.revenue));
            assert!((5_000..15_000).contains(&m.users));
            assert!((500..1_500).contains(&m.conversions));
            assert!((-10.0..10.0).contains(&m.growth));
            assert!(m.id.starts_with("mock-"));
        }
    }

    #[test]
    fn history_is_daily_and_ends_now() {
        let mut source = SyntheticSource::seeded(1);
        let history = source.revenue(now(), HISTORY_POINTS);
        assert_eq!(history.len(), HISTORY_POINTS);
        assert_eq!(history.last().map(|p| p.date), Some(now()));
        assert_eq!(history[0].date, now() - Duration::days(29));
        for pair in history.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
        assert!(history
            .iter()
            .all(|p| (25_000.0..75_000.0).contains(&p.revenue)));
    }

    #[test]
    fn campaigns_use_fixed_channels() {
        let mut source = SyntheticSource::seeded(3);
        let campaigns = source.campaigns(now());
        let names: Vec<&str> = campaigns.iter().map(|c| c.campaign.as_str()).collect();
        assert_eq!(names, MOCK_CAMPAIGNS.to_vec());
        assert!(campaigns.iter().all(|c| (100..600).contains(&c.conversions)));
    }

    #[test]
    fn same_seed_same_values() {
        let a = SyntheticSource::seeded(42).overview(now());
        let b = SyntheticSource::seeded(42).overview(now());
        assert_eq!(a, b);
        assert_eq!(SyntheticSource::seeded(0).health().status, "mock-healthy");
    }
}
