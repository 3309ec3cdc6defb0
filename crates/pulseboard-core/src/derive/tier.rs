use serde::Serialize;

use crate::metrics::CampaignConversion;

/// Ordinal performance bucket for a campaign's conversion count.
///
/// Boundaries: Excellent `> 200`, Good `101..=200`, Average `51..=100`,
/// Poor `<= 50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Excellent,
    Good,
    Average,
    Poor,
}

impl PerformanceTier {
    pub const ALL: [PerformanceTier; 4] = [
        PerformanceTier::Excellent,
        PerformanceTier::Good,
        PerformanceTier::Average,
        PerformanceTier::Poor,
    ];

    pub fn from_conversions(conversions: u64) -> Self {
        match conversions {
            201.. => PerformanceTier::Excellent,
            101..=200 => PerformanceTier::Good,
            51..=100 => PerformanceTier::Average,
            _ => PerformanceTier::Poor,
        }
    }

    /// Badge text.
    pub fn name(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::Average => "Average",
            PerformanceTier::Poor => "Poor",
        }
    }

    /// Legend text for the distribution chart.
    pub fn legend(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent (200+)",
            PerformanceTier::Good => "Good (100-200)",
            PerformanceTier::Average => "Average (50-100)",
            PerformanceTier::Poor => "Poor (<50)",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "#22c55e",
            PerformanceTier::Good => "#3b82f6",
            PerformanceTier::Average => "#f59e0b",
            PerformanceTier::Poor => "#ef4444",
        }
    }
}

/// Number of campaigns in one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierCount {
    pub tier: PerformanceTier,
    pub name: &'static str,
    pub count: usize,
    pub color: &'static str,
}

/// Tier counts in tier order, skipping tiers with no campaigns.
pub fn tier_distribution(campaigns: &[CampaignConversion]) -> Vec<TierCount> {
    let mut counts = [0usize; 4];
    for c in campaigns {
        counts[PerformanceTier::from_conversions(c.conversions) as usize] += 1;
    }
    PerformanceTier::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(&tier, count)| TierCount {
            tier,
            name: tier.legend(),
            count,
            color: tier.color(),
        })
        .collect()
}

/// Share of campaigns rated Good or better, in percent. 0 for no campaigns.
pub fn success_rate(campaigns: &[CampaignConversion]) -> f64 {
    if campaigns.is_empty() {
        return 0.0;
    }
    let successful = campaigns
        .iter()
        .filter(|c| PerformanceTier::from_conversions(c.conversions) <= PerformanceTier::Good)
        .count();
    successful as f64 / campaigns.len() as f64 * 100.0
}
