//! Inserts and listings for the overview, campaigns and revenue tables.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use pulseboard_core::metrics::{
    CampaignConversion, NewCampaignConversion, NewOverviewMetrics, NewRevenueDataPoint,
    OverviewMetrics, RevenueDataPoint,
};

use crate::DuckDbBackend;

fn to_db_count(field: &str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("{field} out of range: {value}"))
}

fn from_db_count(field: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("stored {field} is negative: {value}"))
}

fn from_db_date(date_ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(date_ms).ok_or_else(|| anyhow!("invalid date_ms: {date_ms}"))
}

type OverviewRow = (String, f64, i64, i64, f64, i64);

fn overview_row(row: &duckdb::Row<'_>) -> duckdb::Result<OverviewRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl DuckDbBackend {
    pub async fn insert_overview_at(
        &self,
        new: NewOverviewMetrics,
        date: DateTime<Utc>,
    ) -> Result<OverviewMetrics> {
        let record = new.into_record(new_id(), date);
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO overview (id, revenue, users, conversions, growth, date_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            duckdb::params![
                record.id,
                record.revenue,
                to_db_count("users", record.users)?,
                to_db_count("conversions", record.conversions)?,
                record.growth,
                record.date.timestamp_millis(),
            ],
        )?;
        Ok(record)
    }

    /// Overview rows newest first; rows sharing a timestamp keep reverse
    /// insertion order so the last insert counts as latest.
    async fn select_overview(&self, limit: Option<i64>) -> Result<Vec<OverviewMetrics>> {
        let sql = match limit {
            Some(_) => {
                "SELECT id, revenue, users, conversions, growth, date_ms FROM overview \
                 ORDER BY date_ms DESC, seq DESC LIMIT ?1"
            }
            None => {
                "SELECT id, revenue, users, conversions, growth, date_ms FROM overview \
                 ORDER BY date_ms DESC, seq DESC"
            }
        };
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(sql)?;
        let raw = match limit {
            Some(limit) => stmt
                .query_map(duckdb::params![limit], overview_row)?
                .collect::<duckdb::Result<Vec<_>>>()?,
            None => stmt
                .query_map([], overview_row)?
                .collect::<duckdb::Result<Vec<_>>>()?,
        };
        raw.into_iter()
            .map(|(id, revenue, users, conversions, growth, date_ms)| {
                Ok(OverviewMetrics {
                    id,
                    revenue,
                    users: from_db_count("users", users)?,
                    conversions: from_db_count("conversions", conversions)?,
                    growth,
                    date: from_db_date(date_ms)?,
                })
            })
            .collect()
    }

    pub async fn list_overview_newest_first(&self) -> Result<Vec<OverviewMetrics>> {
        self.select_overview(None).await
    }

    pub async fn latest_overview_row(&self) -> Result<Option<OverviewMetrics>> {
        Ok(self.select_overview(Some(1)).await?.into_iter().next())
    }

    pub async fn insert_campaign_at(
        &self,
        new: NewCampaignConversion,
        date: DateTime<Utc>,
    ) -> Result<CampaignConversion> {
        let record = new.into_record(new_id(), date);
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO campaigns (id, campaign, conversions, date_ms) VALUES (?1, ?2, ?3, ?4)",
            duckdb::params![
                record.id,
                record.campaign,
                to_db_count("conversions", record.conversions)?,
                record.date.timestamp_millis(),
            ],
        )?;
        Ok(record)
    }

    pub async fn list_campaign_rows(&self) -> Result<Vec<CampaignConversion>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, campaign, conversions, date_ms FROM campaigns ORDER BY date_ms ASC, seq ASC",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;
        raw.into_iter()
            .map(|(id, campaign, conversions, date_ms)| {
                Ok(CampaignConversion {
                    id,
                    campaign,
                    conversions: from_db_count("conversions", conversions)?,
                    date: from_db_date(date_ms)?,
                })
            })
            .collect()
    }

    pub async fn insert_revenue_at(
        &self,
        new: NewRevenueDataPoint,
        date: DateTime<Utc>,
    ) -> Result<RevenueDataPoint> {
        let record = new.into_record(new_id(), date);
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO revenue (id, revenue, source, region, date_ms) VALUES (?1, ?2, ?3, ?4, ?5)",
            duckdb::params![
                record.id,
                record.revenue,
                record.source,
                record.region,
                record.date.timestamp_millis(),
            ],
        )?;
        Ok(record)
    }

    pub async fn list_revenue_rows(&self) -> Result<Vec<RevenueDataPoint>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, revenue, source, region, date_ms FROM revenue ORDER BY date_ms ASC, seq ASC",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;
        raw.into_iter()
            .map(|(id, revenue, source, region, date_ms)| {
                Ok(RevenueDataPoint {
                    id,
                    date: from_db_date(date_ms)?,
                    revenue,
                    source,
                    region,
                })
            })
            .collect()
    }
}
