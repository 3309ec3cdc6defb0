use serde::Serialize;

use crate::derive::stats::summarize;
use crate::metrics::{CampaignConversion, RevenueDataPoint};

/// Assumed revenue earned per conversion.
pub const REVENUE_PER_CONVERSION: f64 = 25.0;
/// Revenue target the goal progress bar measures against.
pub const REVENUE_GOAL: f64 = 75_000.0;

/// Rough campaign ROI figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CampaignEstimates {
    pub total_conversions: u64,
    /// Rounded mean conversions per campaign.
    pub average_conversions: u64,
    /// Estimated conversion rate in percent.
    pub conversion_rate: f64,
    pub estimated_revenue: f64,
    pub campaigns_per_month: f64,
}

pub fn estimated_campaign_revenue(c: &CampaignConversion) -> f64 {
    c.conversions as f64 * REVENUE_PER_CONVERSION
}

pub fn campaign_estimates(campaigns: &[CampaignConversion]) -> CampaignEstimates {
    let summary = summarize(campaigns.iter().map(|c| c.conversions as f64));
    let total_conversions: u64 = campaigns.iter().map(|c| c.conversions).sum();
    CampaignEstimates {
        total_conversions,
        average_conversions: summary.average.round() as u64,
        conversion_rate: summary.average * 0.1,
        estimated_revenue: total_conversions as f64 * REVENUE_PER_CONVERSION,
        campaigns_per_month: campaigns.len() as f64 / 12.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueProjection {
    pub total: f64,
    /// Progress towards [`REVENUE_GOAL`] in percent; may exceed 100.
    pub goal_progress: f64,
    /// `goal_progress` clamped to 100 for progress bars.
    pub goal_progress_display: f64,
    /// Mean revenue per point extrapolated to a year.
    pub projected_annual: f64,
}

pub fn revenue_projection(points: &[RevenueDataPoint]) -> RevenueProjection {
    let summary = summarize(points.iter().map(|p| p.revenue));
    let goal_progress = summary.total / REVENUE_GOAL * 100.0;
    RevenueProjection {
        total: summary.total,
        goal_progress,
        goal_progress_display: goal_progress.min(100.0),
        projected_annual: summary.average * 365.0,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn campaign(conversions: u64) -> CampaignConversion {
        CampaignConversion {
            id: "c".to_string(),
            campaign: "c".to_string(),
            conversions,
            date: Utc::now(),
        }
    }

    fn point(revenue: f64) -> RevenueDataPoint {
        RevenueDataPoint {
            id: "r".to_string(),
            date: Utc::now(),
            revenue,
            source: None,
            region: None,
        }
    }

    #[test]
    fn campaign_estimates_from_conversions() {
        let e = campaign_estimates(&[campaign(150), campaign(280)]);
        assert_eq!(e.total_conversions, 430);
        assert_eq!(e.average_conversions, 215);
        assert!((e.conversion_rate - 21.5).abs() < 1e-9);
        assert_eq!(e.estimated_revenue, 10_750.0);
        assert_eq!(estimated_campaign_revenue(&campaign(4)), 100.0);
    }

    #[test]
    fn empty_campaigns_give_zero_estimates() {
        let e = campaign_estimates(&[]);
        assert_eq!(e.total_conversions, 0);
        assert_eq!(e.conversion_rate, 0.0);
        assert_eq!(e.campaigns_per_month, 0.0);
    }

    #[test]
    fn goal_progress_is_clamped_for_display() {
        let p = revenue_projection(&[point(100_000.0), point(50_000.0)]);
        assert_eq!(p.goal_progress, 200.0);
        assert_eq!(p.goal_progress_display, 100.0);
        assert_eq!(p.projected_annual, 75_000.0 * 365.0);
        assert_eq!(revenue_projection(&[]).projected_annual, 0.0);
    }
}
