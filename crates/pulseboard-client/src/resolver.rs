//! Resolves each dashboard domain from the API, falling back to synthetic
//! data when the backend is unavailable.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use pulseboard_core::metrics::{
    CampaignConversion, HealthStatus, NewCampaignConversion, NewOverviewMetrics,
    NewRevenueDataPoint, OverviewMetrics, RevenueDataPoint,
};

use crate::api::{ApiError, DashboardApi, FailureClass};
use crate::cache::{DashboardCache, DemoMode, Domain, DomainData, Resolved};
use crate::config::FallbackMode;
use crate::fallback::{SyntheticSource, HISTORY_POINTS};
use crate::policy::{Decision, FetchOutcome};

pub struct Resolver<A> {
    api: A,
    cache: Arc<DashboardCache>,
    synthetic: Mutex<SyntheticSource<StdRng>>,
    mode: FallbackMode,
    echo_seq: AtomicU64,
}

impl<A: DashboardApi> Resolver<A> {
    pub fn new(api: A, cache: Arc<DashboardCache>, mode: FallbackMode) -> Self {
        Self {
            api,
            cache,
            synthetic: Mutex::new(SyntheticSource::from_entropy()),
            mode,
            echo_seq: AtomicU64::new(0),
        }
    }

    /// Replace the synthetic source, e.g. with a seeded one in tests.
    pub fn with_synthetic(mut self, source: SyntheticSource<StdRng>) -> Self {
        self.synthetic = Mutex::new(source);
        self
    }

    pub fn cache(&self) -> &Arc<DashboardCache> {
        &self.cache
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn demo_mode(&self) -> DemoMode {
        self.cache.demo_mode().await
    }

    /// Fetch `T` with retries, falling back to synthetic data, and store the
    /// result under a ticket taken before the first attempt.
    async fn resolve<T, F, Fut, S>(&self, fetch: F, synthesize: S) -> Resolved<T>
    where
        T: DomainData,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
        S: FnOnce(&mut SyntheticSource<StdRng>, DateTime<Utc>) -> T,
    {
        let domain = T::DOMAIN;
        let ticket = self.cache.begin(domain).await;

        let resolved = if self.mode == FallbackMode::Always {
            self.synthesize(synthesize).await
        } else {
            let policy = domain.retry_policy();
            let mut retries = 0;
            loop {
                let outcome = FetchOutcome::from_result(fetch().await);
                let (class, error) = match outcome {
                    FetchOutcome::Ok(data) => break Resolved::remote(data),
                    FetchOutcome::TransientFailure(e) => (FailureClass::Transient, e),
                    FetchOutcome::PermanentFailure(e) => (FailureClass::Permanent, e),
                };
                let fallback_in_use = self.cache.fallback_in_use(domain).await;
                match policy.decide(class, retries, fallback_in_use) {
                    Decision::Retry(after) => {
                        debug!(
                            domain = domain.key(),
                            error = %error,
                            retry = retries + 1,
                            delay_ms = after.as_millis() as u64,
                            "retrying fetch"
                        );
                        tokio::time::sleep(after).await;
                        retries += 1;
                    }
                    Decision::Fallback => {
                        warn!(
                            domain = domain.key(),
                            error = %error,
                            retries,
                            "backend unavailable, serving synthetic data"
                        );
                        break self.synthesize(synthesize).await;
                    }
                }
            }
        };

        self.cache.store(ticket, resolved.clone()).await;
        resolved
    }

    async fn synthesize<T>(
        &self,
        synthesize: impl FnOnce(&mut SyntheticSource<StdRng>, DateTime<Utc>) -> T,
    ) -> Resolved<T> {
        let mut source = self.synthetic.lock().await;
        Resolved::fallback(synthesize(&mut source, Utc::now()))
    }

    /// The cached value while it is fresh, otherwise a new resolution.
    async fn read<T, F, Fut, S>(&self, fetch: F, synthesize: S) -> Resolved<T>
    where
        T: DomainData,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
        S: FnOnce(&mut SyntheticSource<StdRng>, DateTime<Utc>) -> T,
    {
        if let Some(hit) = self.cache.fresh::<T>(Instant::now()).await {
            return hit;
        }
        self.resolve(fetch, synthesize).await
    }

    pub async fn latest_overview(&self) -> Resolved<OverviewMetrics> {
        self.read(|| self.api.latest_overview(), SyntheticSource::overview)
            .await
    }

    pub async fn overview_history(&self) -> Resolved<Vec<OverviewMetrics>> {
        self.read(|| self.api.overview_history(), synthetic_history)
            .await
    }

    pub async fn campaigns(&self) -> Resolved<Vec<CampaignConversion>> {
        self.read(|| self.api.campaigns(), SyntheticSource::campaigns)
            .await
    }

    pub async fn revenue(&self) -> Resolved<Vec<RevenueDataPoint>> {
        self.read(|| self.api.revenue(), synthetic_revenue).await
    }

    pub async fn health(&self) -> Resolved<HealthStatus> {
        self.read(|| self.api.health(), synthetic_health).await
    }

    /// Re-resolve `domain` regardless of freshness.
    pub async fn refresh(&self, domain: Domain) {
        match domain {
            Domain::OverviewLatest => {
                self.resolve(|| self.api.latest_overview(), SyntheticSource::overview)
                    .await;
            }
            Domain::OverviewAll => {
                self.resolve(|| self.api.overview_history(), synthetic_history)
                    .await;
            }
            Domain::Campaigns => {
                self.resolve(|| self.api.campaigns(), SyntheticSource::campaigns)
                    .await;
            }
            Domain::Revenue => {
                self.resolve(|| self.api.revenue(), synthetic_revenue).await;
            }
            Domain::Health => {
                self.resolve(|| self.api.health(), synthetic_health).await;
            }
        }
    }

    /// Re-resolve every domain concurrently.
    pub async fn refresh_all(&self) {
        tokio::join!(
            self.refresh(Domain::OverviewLatest),
            self.refresh(Domain::OverviewAll),
            self.refresh(Domain::Campaigns),
            self.refresh(Domain::Revenue),
            self.refresh(Domain::Health),
        );
        let demo = self.cache.demo_mode().await;
        info!(demo_mode = demo.any(), "all domains refreshed");
    }

    async fn refresh_if_due(&self, domain: Domain, now: Instant) -> bool {
        if !self.cache.is_due(domain, now).await {
            return false;
        }
        self.refresh(domain).await;
        true
    }

    /// Re-resolve the domains whose refresh interval has elapsed, concurrently.
    /// Returns how many were refreshed.
    pub async fn refresh_due(&self) -> usize {
        let now = Instant::now();
        let refreshed = tokio::join!(
            self.refresh_if_due(Domain::OverviewLatest, now),
            self.refresh_if_due(Domain::OverviewAll, now),
            self.refresh_if_due(Domain::Campaigns, now),
            self.refresh_if_due(Domain::Revenue, now),
            self.refresh_if_due(Domain::Health, now),
        );
        [refreshed.0, refreshed.1, refreshed.2, refreshed.3, refreshed.4]
            .into_iter()
            .filter(|r| *r)
            .count()
    }

    /// Id for a local echo, e.g. `mock-campaign-created-1718000000000-3`.
    fn echo_id(&self, domain: Domain) -> String {
        let prefix = match domain {
            Domain::Campaigns => "mock-campaign-created",
            Domain::Revenue => "mock-revenue-created",
            _ => "mock-created",
        };
        let seq = self.echo_seq.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}-{}-{seq}", Utc::now().timestamp_millis())
    }

    /// Run a write. Client errors are returned; any other failure yields a
    /// local echo built by `echo`.
    async fn write<T, Fut>(
        &self,
        domain: Domain,
        send: Fut,
        echo: impl FnOnce(String, DateTime<Utc>) -> T,
    ) -> Result<Resolved<T>, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match send.await {
            Ok(created) => Ok(Resolved::remote(created)),
            Err(e) if e.is_client_error() => {
                warn!(domain = domain.key(), error = %e, "write rejected");
                Err(e)
            }
            Err(e) => {
                warn!(domain = domain.key(), error = %e, "write failed, keeping local echo");
                Ok(Resolved::fallback(echo(self.echo_id(domain), Utc::now())))
            }
        }
    }

    pub async fn create_overview(
        &self,
        new: NewOverviewMetrics,
    ) -> Result<Resolved<OverviewMetrics>, ApiError> {
        new.validate()?;
        let created = self
            .write(Domain::OverviewLatest, self.api.create_overview(&new), |id, now| {
                new.clone().into_record(id, now)
            })
            .await?;
        self.cache.merge_overview(created.clone()).await;
        Ok(created)
    }

    pub async fn create_campaign(
        &self,
        new: NewCampaignConversion,
    ) -> Result<Resolved<CampaignConversion>, ApiError> {
        new.validate()?;
        let created = self
            .write(Domain::Campaigns, self.api.create_campaign(&new), |id, now| {
                new.clone().into_record(id, now)
            })
            .await?;
        self.cache.merge_campaign(created.clone()).await;
        Ok(created)
    }

    pub async fn create_revenue(
        &self,
        new: NewRevenueDataPoint,
    ) -> Result<Resolved<RevenueDataPoint>, ApiError> {
        new.validate()?;
        let created = self
            .write(Domain::Revenue, self.api.create_revenue(&new), |id, now| {
                new.clone().into_record(id, now)
            })
            .await?;
        self.cache.merge_revenue(created.clone()).await;
        Ok(created)
    }
}

/// Synthetic history, newest first like the API returns it.
fn synthetic_history(
    source: &mut SyntheticSource<StdRng>,
    now: DateTime<Utc>,
) -> Vec<OverviewMetrics> {
    let mut history = source.overview_history(now, HISTORY_POINTS);
    history.reverse();
    history
}

fn synthetic_revenue(
    source: &mut SyntheticSource<StdRng>,
    now: DateTime<Utc>,
) -> Vec<RevenueDataPoint> {
    source.revenue(now, HISTORY_POINTS)
}

fn synthetic_health(source: &mut SyntheticSource<StdRng>, _now: DateTime<Utc>) -> HealthStatus {
    source.health()
}
