use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::{CampaignConversion, OverviewMetrics, RevenueDataPoint};

/// Label width for full-size campaign charts.
pub const CAMPAIGN_LABEL_MAX: usize = 15;
/// Label width for compact campaign charts.
pub const COMPACT_LABEL_MAX: usize = 12;
/// Compact campaign charts show at most this many bars.
pub const COMPACT_BAR_LIMIT: usize = 10;

const ELLIPSIS: &str = "...";

/// The minimal `(date, value)` shape line and area charts consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeriesPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A named bar for categorical charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPoint {
    pub name: String,
    pub value: f64,
}

/// Which overview field to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewField {
    Revenue,
    Users,
    Conversions,
    Growth,
}

impl OverviewField {
    pub fn value(self, m: &OverviewMetrics) -> f64 {
        match self {
            OverviewField::Revenue => m.revenue,
            OverviewField::Users => m.users as f64,
            OverviewField::Conversions => m.conversions as f64,
            OverviewField::Growth => m.growth,
        }
    }
}

/// Shorten `name` to at most `max` characters, appending `...` when cut.
///
/// Counts characters, not bytes, so multi-byte names are never split.
pub fn truncate_label(name: &str, max: usize) -> Cow<'_, str> {
    match name.char_indices().nth(max) {
        Some((cut, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &name[..cut])),
        None => Cow::Borrowed(name),
    }
}

/// Revenue points as a chart series, in input order.
pub fn revenue_series(points: &[RevenueDataPoint]) -> Vec<ChartSeriesPoint> {
    points
        .iter()
        .map(|p| ChartSeriesPoint {
            date: p.date,
            value: p.revenue,
            label: None,
        })
        .collect()
}

/// One overview field over the history, in input order.
pub fn overview_series(history: &[OverviewMetrics], field: OverviewField) -> Vec<ChartSeriesPoint> {
    history
        .iter()
        .map(|m| ChartSeriesPoint {
            date: m.date,
            value: field.value(m),
            label: None,
        })
        .collect()
}

/// Campaign conversions as a dated series, labelled with the campaign name.
pub fn campaign_series(campaigns: &[CampaignConversion]) -> Vec<ChartSeriesPoint> {
    campaigns
        .iter()
        .map(|c| ChartSeriesPoint {
            date: c.date,
            value: c.conversions as f64,
            label: Some(c.campaign.clone()),
        })
        .collect()
}

/// Campaign bars with labels shortened to [`CAMPAIGN_LABEL_MAX`].
pub fn campaign_bars(campaigns: &[CampaignConversion]) -> Vec<BarPoint> {
    bars(campaigns.iter(), CAMPAIGN_LABEL_MAX)
}

/// The first [`COMPACT_BAR_LIMIT`] campaigns with labels shortened to
/// [`COMPACT_LABEL_MAX`].
pub fn compact_campaign_bars(campaigns: &[CampaignConversion]) -> Vec<BarPoint> {
    bars(
        campaigns.iter().take(COMPACT_BAR_LIMIT),
        COMPACT_LABEL_MAX,
    )
}

fn bars<'a>(campaigns: impl Iterator<Item = &'a CampaignConversion>, max: usize) -> Vec<BarPoint> {
    campaigns
        .map(|c| BarPoint {
            name: truncate_label(&c.campaign, max).into_owned(),
            value: c.conversions as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn campaign(name: &str, conversions: u64) -> CampaignConversion {
        CampaignConversion {
            id: name.to_string(),
            campaign: name.to_string(),
            conversions,
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn short_labels_are_borrowed() {
        assert!(matches!(truncate_label("Google Ads", 15), Cow::Borrowed(_)));
        assert_eq!(truncate_label("Exactly15Chars!", 15), "Exactly15Chars!");
    }

    #[test]
    fn long_labels_are_cut_with_ellipsis() {
        assert_eq!(
            truncate_label("Influencer Marketing", CAMPAIGN_LABEL_MAX),
            "Influencer Mark..."
        );
        assert_eq!(
            truncate_label("Influencer Marketing", COMPACT_LABEL_MAX),
            "Influencer M..."
        );
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_label("Ünïcödé-Kampagne", 7), "Ünïcödé...");
    }

    #[test]
    fn bars_leave_campaign_names_untouched() {
        let campaigns = vec![campaign("Influencer Marketing", 320)];
        let bars = campaign_bars(&campaigns);
        assert_eq!(bars[0].name, "Influencer Mark...");
        assert_eq!(bars[0].value, 320.0);
        assert_eq!(campaigns[0].campaign, "Influencer Marketing");
    }

    #[test]
    fn compact_bars_take_first_ten() {
        let campaigns: Vec<_> = (0..14).map(|i| campaign(&format!("c{i}"), i)).collect();
        let bars = compact_campaign_bars(&campaigns);
        assert_eq!(bars.len(), COMPACT_BAR_LIMIT);
        assert_eq!(bars[9].name, "c9");
    }

    #[test]
    fn revenue_series_keeps_order() {
        let points: Vec<_> = [(1, 45000.0), (2, 52000.0), (3, 48000.0)]
            .into_iter()
            .map(|(day, revenue)| RevenueDataPoint {
                id: format!("r{day}"),
                date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
                revenue,
                source: None,
                region: None,
            })
            .collect();
        let series = revenue_series(&points);
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![45000.0, 52000.0, 48000.0]);
        assert_eq!(series[0].date, points[0].date);
    }
}
