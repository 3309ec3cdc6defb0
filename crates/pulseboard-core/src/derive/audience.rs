//! Audience estimates derived from the latest overview snapshot.
//!
//! The backend only reports a total user count and a growth rate. Breakdowns
//! here apply fixed population shares to that total; they are estimates, not
//! measurements.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::derive::distribution::{DistributionSlice, CONVERSIONS_COLOR, REVENUE_COLOR, USERS_COLOR};
use crate::derive::series::ChartSeriesPoint;
use crate::metrics::OverviewMetrics;

/// Days covered by the back-projected user growth chart.
pub const USER_GROWTH_DAYS: i64 = 10;

const AGE_SHARES: [(&str, f64); 5] = [
    ("18-24", 0.20),
    ("25-34", 0.30),
    ("35-44", 0.25),
    ("45-54", 0.15),
    ("55+", 0.10),
];

const LOCATION_SHARES: [(&str, f64); 6] = [
    ("United States", 0.28),
    ("United Kingdom", 0.17),
    ("Canada", 0.14),
    ("Australia", 0.11),
    ("Germany", 0.09),
    ("Others", 0.21),
];

const NEW_USER_SHARE: f64 = 0.25;
const ACTIVE_USER_SHARE: f64 = 0.68;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub name: &'static str,
    pub value: u64,
}

fn share_of(total: u64, share: f64) -> u64 {
    (total as f64 * share).round() as u64
}

fn segments(total: u64, shares: &[(&'static str, f64)]) -> Vec<Segment> {
    shares
        .iter()
        .map(|&(name, share)| Segment {
            name,
            value: share_of(total, share),
        })
        .collect()
}

/// Estimated users per age bracket.
pub fn demographics(users: u64) -> Vec<Segment> {
    segments(users, &AGE_SHARES)
}

/// Estimated users per country.
pub fn locations(users: u64) -> Vec<Segment> {
    segments(users, &LOCATION_SHARES)
}

/// Device split in percent.
pub fn device_split() -> Vec<DistributionSlice> {
    vec![
        DistributionSlice {
            name: "Desktop".to_string(),
            value: 45.0,
            color: REVENUE_COLOR,
        },
        DistributionSlice {
            name: "Mobile".to_string(),
            value: 40.0,
            color: USERS_COLOR,
        },
        DistributionSlice {
            name: "Tablet".to_string(),
            value: 15.0,
            color: CONVERSIONS_COLOR,
        },
    ]
}

/// Back-project the user count over the last [`USER_GROWTH_DAYS`] days.
///
/// Day `i` before `now` is estimated as `users * (1 - growth% * i / 10)`,
/// clamped at zero. The last point is `now` with the current user count.
pub fn user_growth_series(latest: &OverviewMetrics, now: DateTime<Utc>) -> Vec<ChartSeriesPoint> {
    let rate = latest.growth / 100.0;
    (0..USER_GROWTH_DAYS)
        .rev()
        .map(|i| {
            let estimate = latest.users as f64 * (1.0 - rate * i as f64 / 10.0);
            ChartSeriesPoint {
                date: now - Duration::days(i),
                value: estimate.round().max(0.0),
                label: None,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Engagement {
    pub total_users: u64,
    pub new_users: u64,
    pub active_users: u64,
    pub daily_active: u64,
    pub weekly_active: u64,
    pub monthly_active: u64,
}

pub fn engagement(users: u64) -> Engagement {
    let active = share_of(users, ACTIVE_USER_SHARE);
    Engagement {
        total_users: users,
        new_users: share_of(users, NEW_USER_SHARE),
        active_users: active,
        daily_active: share_of(active, 0.4),
        weekly_active: share_of(active, 0.7),
        monthly_active: active,
    }
}

impl Engagement {
    /// Active users as a percentage of all users; 0 when there are none.
    pub fn active_rate(&self) -> f64 {
        if self.total_users == 0 {
            return 0.0;
        }
        self.active_users as f64 / self.total_users as f64 * 100.0
    }
}
