use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A point-in-time snapshot of the headline dashboard numbers.
///
/// The newest snapshot drives the metric cards; the full history feeds the
/// overview charts and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub id: String,
    pub revenue: f64,
    pub users: u64,
    pub conversions: u64,
    /// Signed percentage, e.g. `12.5` for +12.5 %.
    pub growth: f64,
    pub date: DateTime<Utc>,
}

/// Conversions attributed to one campaign launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConversion {
    pub id: String,
    pub campaign: String,
    pub conversions: u64,
    pub date: DateTime<Utc>,
}

/// A single revenue observation. Several points may share a date; they are
/// independent observations and only merged by explicit monthly bucketing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueDataPoint {
    pub id: String,
    pub date: DateTime<Utc>,
    pub revenue: f64,
    /// Revenue stream, e.g. "subscription", "one-time", "ads".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Sales region, e.g. "US", "EU", "APAC".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Body of `GET /api/v1/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Body of `POST /api/v1/overview`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOverviewMetrics {
    pub revenue: f64,
    pub users: u64,
    pub conversions: u64,
    pub growth: f64,
}

/// Body of `POST /api/v1/campaigns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCampaignConversion {
    pub campaign: String,
    pub conversions: u64,
}

/// Body of `POST /api/v1/revenue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRevenueDataPoint {
    pub revenue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

fn check_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}

impl NewOverviewMetrics {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_amount("revenue", self.revenue)?;
        if !self.growth.is_finite() {
            return Err(ValidationError::NotFinite { field: "growth" });
        }
        Ok(())
    }

    /// Attach an id and timestamp, producing the stored record.
    pub fn into_record(self, id: String, date: DateTime<Utc>) -> OverviewMetrics {
        OverviewMetrics {
            id,
            revenue: self.revenue,
            users: self.users,
            conversions: self.conversions,
            growth: self.growth,
            date,
        }
    }
}

impl NewCampaignConversion {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.campaign.trim().is_empty() {
            return Err(ValidationError::Empty { field: "campaign" });
        }
        Ok(())
    }

    pub fn into_record(self, id: String, date: DateTime<Utc>) -> CampaignConversion {
        CampaignConversion {
            id,
            campaign: self.campaign,
            conversions: self.conversions,
            date,
        }
    }
}

impl NewRevenueDataPoint {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_amount("revenue", self.revenue)
    }

    pub fn into_record(self, id: String, date: DateTime<Utc>) -> RevenueDataPoint {
        RevenueDataPoint {
            id,
            date,
            revenue: self.revenue,
            source: self.source,
            region: self.region,
        }
    }
}
