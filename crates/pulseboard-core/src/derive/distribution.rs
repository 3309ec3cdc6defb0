use serde::Serialize;

use crate::metrics::OverviewMetrics;

pub const REVENUE_COLOR: &str = "#8884d8";
pub const USERS_COLOR: &str = "#82ca9d";
pub const CONVERSIONS_COLOR: &str = "#ffc658";

/// One slice of a donut chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub name: String,
    pub value: f64,
    pub color: &'static str,
}

impl DistributionSlice {
    fn new(name: &str, value: f64, color: &'static str) -> Self {
        Self {
            name: name.to_string(),
            value,
            color,
        }
    }
}

/// Revenue, users and conversions rescaled into comparable magnitudes.
///
/// Revenue is shown in thousands and conversions are multiplied by ten so
/// that all three slices are visible in a single donut.
pub fn metric_distribution(m: &OverviewMetrics) -> Vec<DistributionSlice> {
    vec![
        DistributionSlice::new("Revenue", m.revenue / 1000.0, REVENUE_COLOR),
        DistributionSlice::new("Users", m.users as f64, USERS_COLOR),
        DistributionSlice::new("Conversions", m.conversions as f64 * 10.0, CONVERSIONS_COLOR),
    ]
}

/// Percentage share of each slice. All zeros when the total is zero.
pub fn slice_shares(slices: &[DistributionSlice]) -> Vec<f64> {
    let total: f64 = slices.iter().map(|s| s.value).sum();
    slices
        .iter()
        .map(|s| {
            if total > 0.0 {
                s.value / total * 100.0
            } else {
                0.0
            }
        })
        .collect()
}
