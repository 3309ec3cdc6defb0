//! Storage abstraction for the three metric collections.

use anyhow::Result;
use async_trait::async_trait;

use crate::metrics::{
    CampaignConversion, NewCampaignConversion, NewOverviewMetrics, NewRevenueDataPoint,
    OverviewMetrics, RevenueDataPoint,
};

/// Persistence used by the REST server.
///
/// Implementations assign ids and timestamps on insert and return the stored
/// record, which the server echoes back to the caller.
#[async_trait]
pub trait MetricsStore: Send + Sync + 'static {
    /// Lightweight liveness check.
    async fn ping(&self) -> Result<()>;

    async fn insert_overview(&self, new: NewOverviewMetrics) -> Result<OverviewMetrics>;
    /// Full history, newest first.
    async fn list_overview(&self) -> Result<Vec<OverviewMetrics>>;
    async fn latest_overview(&self) -> Result<Option<OverviewMetrics>>;

    async fn insert_campaign(&self, new: NewCampaignConversion) -> Result<CampaignConversion>;
    /// All campaigns, oldest first.
    async fn list_campaigns(&self) -> Result<Vec<CampaignConversion>>;

    async fn insert_revenue(&self, new: NewRevenueDataPoint) -> Result<RevenueDataPoint>;
    /// All revenue points, oldest first.
    async fn list_revenue(&self) -> Result<Vec<RevenueDataPoint>>;
}
