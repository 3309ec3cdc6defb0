use async_trait::async_trait;
use chrono::Utc;

use pulseboard_core::metrics::{
    CampaignConversion, NewCampaignConversion, NewOverviewMetrics, NewRevenueDataPoint,
    OverviewMetrics, RevenueDataPoint,
};
use pulseboard_core::store::MetricsStore;

use crate::DuckDbBackend;

#[async_trait]
impl MetricsStore for DuckDbBackend {
    async fn ping(&self) -> anyhow::Result<()> {
        DuckDbBackend::ping(self).await
    }

    async fn insert_overview(&self, new: NewOverviewMetrics) -> anyhow::Result<OverviewMetrics> {
        self.insert_overview_at(new, Utc::now()).await
    }

    async fn list_overview(&self) -> anyhow::Result<Vec<OverviewMetrics>> {
        self.list_overview_newest_first().await
    }

    async fn latest_overview(&self) -> anyhow::Result<Option<OverviewMetrics>> {
        self.latest_overview_row().await
    }

    async fn insert_campaign(
        &self,
        new: NewCampaignConversion,
    ) -> anyhow::Result<CampaignConversion> {
        self.insert_campaign_at(new, Utc::now()).await
    }

    async fn list_campaigns(&self) -> anyhow::Result<Vec<CampaignConversion>> {
        self.list_campaign_rows().await
    }

    async fn insert_revenue(&self, new: NewRevenueDataPoint) -> anyhow::Result<RevenueDataPoint> {
        self.insert_revenue_at(new, Utc::now()).await
    }

    async fn list_revenue(&self) -> anyhow::Result<Vec<RevenueDataPoint>> {
        self.list_revenue_rows().await
    }
}
