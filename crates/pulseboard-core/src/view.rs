//! Page-level view models.
//!
//! Each view bundles everything one dashboard page renders from a raw
//! snapshot. Views are rebuilt whenever the underlying records change and
//! are never persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::derive::audience::{self, Engagement, Segment};
use crate::derive::breakdown::{revenue_by_region, revenue_by_source, RevenueShare};
use crate::derive::distribution::{metric_distribution, DistributionSlice};
use crate::derive::estimates::{
    campaign_estimates, estimated_campaign_revenue, revenue_projection, CampaignEstimates,
    RevenueProjection,
};
use crate::derive::growth::{revenue_growth, sequential_growth};
use crate::derive::series::{
    campaign_bars, compact_campaign_bars, overview_series, revenue_series, BarPoint,
    ChartSeriesPoint, OverviewField,
};
use crate::derive::stats::{
    max_by_key, monthly_buckets, monthly_highlights, summarize, top_n, MonthlyBucket,
    MonthlyHighlights, Summary,
};
use crate::derive::tier::{success_rate, tier_distribution, PerformanceTier, TierCount};
use crate::derive::trend::{metric_trends, MetricTrends, TrendIndicator};
use crate::metrics::{CampaignConversion, OverviewMetrics, RevenueDataPoint};

/// Campaigns listed in the "top performers" panel.
pub const TOP_CAMPAIGNS: usize = 5;

/// The landing page: metric cards, revenue chart, distribution and campaign
/// bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub latest: Option<OverviewMetrics>,
    pub trends: Option<MetricTrends>,
    pub distribution: Vec<DistributionSlice>,
    pub revenue_series: Vec<ChartSeriesPoint>,
    pub users_series: Vec<ChartSeriesPoint>,
    pub campaign_bars: Vec<BarPoint>,
    pub compact_campaign_bars: Vec<BarPoint>,
    pub total_revenue: f64,
    /// Mean conversions per campaign.
    pub average_conversions: f64,
}

impl DashboardView {
    pub fn build(
        latest: Option<&OverviewMetrics>,
        history: &[OverviewMetrics],
        campaigns: &[CampaignConversion],
        revenue: &[RevenueDataPoint],
    ) -> Self {
        Self {
            latest: latest.cloned(),
            trends: latest.map(|m| metric_trends(m.growth)),
            distribution: latest.map(metric_distribution).unwrap_or_default(),
            revenue_series: revenue_series(revenue),
            users_series: overview_series(history, OverviewField::Users),
            campaign_bars: campaign_bars(campaigns),
            compact_campaign_bars: compact_campaign_bars(campaigns),
            total_revenue: summarize(revenue.iter().map(|r| r.revenue)).total,
            average_conversions: summarize(campaigns.iter().map(|c| c.conversions as f64)).average,
        }
    }
}

/// One campaign table row with its tier badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignRow {
    pub campaign: CampaignConversion,
    pub tier: PerformanceTier,
    pub badge: &'static str,
    pub estimated_revenue: f64,
}

impl CampaignRow {
    fn from_campaign(c: &CampaignConversion) -> Self {
        let tier = PerformanceTier::from_conversions(c.conversions);
        Self {
            campaign: c.clone(),
            tier,
            badge: tier.name(),
            estimated_revenue: estimated_campaign_revenue(c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignsView {
    pub rows: Vec<CampaignRow>,
    pub bars: Vec<BarPoint>,
    pub tiers: Vec<TierCount>,
    pub top: Vec<CampaignRow>,
    pub top_performer: Option<CampaignConversion>,
    pub success_rate: f64,
    pub estimates: CampaignEstimates,
    /// Launch date of the oldest campaign.
    pub active_since: Option<DateTime<Utc>>,
}

impl CampaignsView {
    pub fn build(campaigns: &[CampaignConversion]) -> Self {
        Self {
            rows: campaigns.iter().map(CampaignRow::from_campaign).collect(),
            bars: campaign_bars(campaigns),
            tiers: tier_distribution(campaigns),
            top: top_n(campaigns, TOP_CAMPAIGNS, |c| c.conversions as f64)
                .into_iter()
                .map(CampaignRow::from_campaign)
                .collect(),
            top_performer: max_by_key(campaigns, |c| c.conversions as f64).cloned(),
            success_rate: success_rate(campaigns),
            estimates: campaign_estimates(campaigns),
            active_since: campaigns.iter().map(|c| c.date).min(),
        }
    }
}

/// A revenue table row with its change against the previous row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueRow {
    pub point: RevenueDataPoint,
    pub growth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueView {
    pub rows: Vec<RevenueRow>,
    pub series: Vec<ChartSeriesPoint>,
    pub summary: Summary,
    pub highest: Option<RevenueDataPoint>,
    pub overall_growth: f64,
    pub trend: TrendIndicator,
    pub monthly: Vec<MonthlyBucket>,
    pub monthly_highlights: MonthlyHighlights,
    pub projection: RevenueProjection,
    pub by_source: Vec<RevenueShare>,
    pub by_region: Vec<RevenueShare>,
}

impl RevenueView {
    pub fn build(points: &[RevenueDataPoint]) -> Self {
        let values: Vec<f64> = points.iter().map(|p| p.revenue).collect();
        let overall_growth = revenue_growth(points);
        let monthly = monthly_buckets(points);
        Self {
            rows: points
                .iter()
                .cloned()
                .zip(sequential_growth(&values))
                .map(|(point, growth)| RevenueRow { point, growth })
                .collect(),
            series: revenue_series(points),
            summary: summarize(values.iter().copied()),
            highest: max_by_key(points, |p| p.revenue).cloned(),
            overall_growth,
            trend: TrendIndicator::from_growth(overall_growth),
            monthly_highlights: monthly_highlights(&monthly),
            monthly,
            projection: revenue_projection(points),
            by_source: revenue_by_source(points),
            by_region: revenue_by_region(points),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudienceView {
    pub trend: TrendIndicator,
    pub growth_series: Vec<ChartSeriesPoint>,
    pub demographics: Vec<Segment>,
    pub locations: Vec<Segment>,
    pub devices: Vec<DistributionSlice>,
    pub engagement: Engagement,
}

impl AudienceView {
    /// `None` when no overview snapshot is available yet.
    pub fn build(latest: Option<&OverviewMetrics>, now: DateTime<Utc>) -> Option<Self> {
        let latest = latest?;
        Some(Self {
            trend: TrendIndicator::from_growth(latest.growth),
            growth_series: audience::user_growth_series(latest, now),
            demographics: audience::demographics(latest.users),
            locations: audience::locations(latest.users),
            devices: audience::device_split(),
            engagement: audience::engagement(latest.users),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn revenue(d: u32, value: f64) -> RevenueDataPoint {
        RevenueDataPoint {
            id: format!("r{d}"),
            date: day(d),
            revenue: value,
            source: None,
            region: None,
        }
    }

    fn campaign(name: &str, conversions: u64, d: u32) -> CampaignConversion {
        CampaignConversion {
            id: name.to_string(),
            campaign: name.to_string(),
            conversions,
            date: day(d),
        }
    }

    #[test]
    fn revenue_view_end_to_end() {
        let points = vec![revenue(1, 45000.0), revenue(2, 52000.0), revenue(3, 48000.0)];
        let view = RevenueView::build(&points);
        let pairs: Vec<(DateTime<Utc>, f64)> =
            view.series.iter().map(|p| (p.date, p.value)).collect();
        assert_eq!(
            pairs,
            vec![(day(1), 45000.0), (day(2), 52000.0), (day(3), 48000.0)]
        );
        assert!((view.overall_growth - 6.7).abs() < 0.05);
        assert_eq!(view.trend.direction, crate::derive::Direction::Up);
        assert_eq!(view.highest.map(|p| p.revenue), Some(52000.0));
        assert_eq!(view.rows[0].growth, None);
        assert_eq!(view.monthly.len(), 1);
        assert_eq!(view.monthly[0].revenue, 145000.0);
    }

    #[test]
    fn campaigns_view_end_to_end() {
        let campaigns = vec![campaign("Spring Launch", 150, 2), campaign("Holiday", 280, 1)];
        let view = CampaignsView::build(&campaigns);
        assert_eq!(view.rows[0].badge, "Good");
        assert_eq!(view.rows[1].badge, "Excellent");
        let tiers: Vec<(PerformanceTier, usize)> =
            view.tiers.iter().map(|t| (t.tier, t.count)).collect();
        assert_eq!(
            tiers,
            vec![(PerformanceTier::Excellent, 1), (PerformanceTier::Good, 1)]
        );
        assert_eq!(
            view.top_performer.map(|c| c.campaign),
            Some("Holiday".to_string())
        );
        assert_eq!(view.top[0].campaign.campaign, "Holiday");
        assert_eq!(view.active_since, Some(day(1)));
    }

    #[test]
    fn views_accept_empty_input() {
        let dashboard = DashboardView::build(None, &[], &[], &[]);
        assert!(dashboard.trends.is_none());
        assert!(dashboard.distribution.is_empty());
        assert_eq!(dashboard.total_revenue, 0.0);
        assert_eq!(dashboard.average_conversions, 0.0);

        let campaigns = CampaignsView::build(&[]);
        assert!(campaigns.tiers.is_empty());
        assert!(campaigns.top_performer.is_none());

        let revenue = RevenueView::build(&[]);
        assert_eq!(revenue.summary, Summary::default());
        assert_eq!(revenue.overall_growth, 0.0);

        assert!(AudienceView::build(None, Utc::now()).is_none());
    }
}
