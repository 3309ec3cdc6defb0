//! Per-domain cache of resolved data.
//!
//! Each domain owns one slot guarded by its own `RwLock`. A slot carries a
//! generation counter: a fetch records the generation it started under (its
//! [`Ticket`]) and its result is only stored if the generation is unchanged.
//! Invalidating or detaching a domain bumps the generation, so responses
//! that arrive afterwards are dropped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;

use pulseboard_core::metrics::{CampaignConversion, HealthStatus, OverviewMetrics, RevenueDataPoint};

use crate::policy::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    OverviewLatest,
    OverviewAll,
    Campaigns,
    Revenue,
    Health,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::OverviewLatest,
        Domain::OverviewAll,
        Domain::Campaigns,
        Domain::Revenue,
        Domain::Health,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Domain::OverviewLatest => "overview-latest",
            Domain::OverviewAll => "overview-all",
            Domain::Campaigns => "campaigns",
            Domain::Revenue => "revenue",
            Domain::Health => "health",
        }
    }

    pub fn refresh_interval(self) -> Duration {
        match self {
            Domain::OverviewLatest | Domain::Campaigns | Domain::Revenue => Duration::from_secs(30),
            Domain::OverviewAll | Domain::Health => Duration::from_secs(60),
        }
    }

    /// How long a stored value may be served to readers without a refetch.
    pub fn stale_after(self) -> Duration {
        match self {
            Domain::OverviewLatest => Duration::from_secs(10),
            _ => Duration::ZERO,
        }
    }

    pub fn retry_policy(self) -> RetryPolicy {
        match self {
            Domain::Health => RetryPolicy::health(),
            _ => RetryPolicy::data(),
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Remote,
    Fallback,
}

/// Data together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    pub data: T,
    pub source: DataSource,
    pub resolved_at: DateTime<Utc>,
}

impl<T> Resolved<T> {
    pub fn remote(data: T) -> Self {
        Self {
            data,
            source: DataSource::Remote,
            resolved_at: Utc::now(),
        }
    }

    pub fn fallback(data: T) -> Self {
        Self {
            data,
            source: DataSource::Fallback,
            resolved_at: Utc::now(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }
}

/// Proof that a fetch started under a given slot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub domain: Domain,
    generation: u64,
}

#[derive(Debug, Default)]
struct SlotMeta {
    generation: u64,
    fetched_at: Option<Instant>,
    attached: bool,
    source: Option<DataSource>,
}

#[derive(Debug)]
pub struct Slot<T> {
    meta: SlotMeta,
    entry: Option<Resolved<T>>,
}

impl SlotMeta {
    /// Take the slot's current value as freshly stored, outdating every
    /// ticket issued so far.
    fn supersede(&mut self) {
        self.generation += 1;
        self.fetched_at = Some(Instant::now());
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            meta: SlotMeta::default(),
            entry: None,
        }
    }
}

/// Record types cached under a single domain.
pub trait DomainData: Clone + Send + Sync + 'static {
    const DOMAIN: Domain;
    fn slot(cache: &DashboardCache) -> &RwLock<Slot<Self>>;
}

impl DomainData for OverviewMetrics {
    const DOMAIN: Domain = Domain::OverviewLatest;
    fn slot(cache: &DashboardCache) -> &RwLock<Slot<Self>> {
        &cache.overview_latest
    }
}

impl DomainData for Vec<OverviewMetrics> {
    const DOMAIN: Domain = Domain::OverviewAll;
    fn slot(cache: &DashboardCache) -> &RwLock<Slot<Self>> {
        &cache.overview_all
    }
}

impl DomainData for Vec<CampaignConversion> {
    const DOMAIN: Domain = Domain::Campaigns;
    fn slot(cache: &DashboardCache) -> &RwLock<Slot<Self>> {
        &cache.campaigns
    }
}

impl DomainData for Vec<RevenueDataPoint> {
    const DOMAIN: Domain = Domain::Revenue;
    fn slot(cache: &DashboardCache) -> &RwLock<Slot<Self>> {
        &cache.revenue
    }
}

impl DomainData for HealthStatus {
    const DOMAIN: Domain = Domain::Health;
    fn slot(cache: &DashboardCache) -> &RwLock<Slot<Self>> {
        &cache.health
    }
}

/// Which domains are currently showing synthetic data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DemoMode {
    pub overview: bool,
    pub campaigns: bool,
    pub revenue: bool,
}

impl DemoMode {
    pub fn any(&self) -> bool {
        self.overview || self.campaigns || self.revenue
    }
}

#[derive(Debug, Default)]
pub struct DashboardCache {
    overview_latest: RwLock<Slot<OverviewMetrics>>,
    overview_all: RwLock<Slot<Vec<OverviewMetrics>>>,
    campaigns: RwLock<Slot<Vec<CampaignConversion>>>,
    revenue: RwLock<Slot<Vec<RevenueDataPoint>>>,
    health: RwLock<Slot<HealthStatus>>,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn with_meta<R>(&self, domain: Domain, f: impl FnOnce(&mut SlotMeta) -> R) -> R {
        match domain {
            Domain::OverviewLatest => f(&mut self.overview_latest.write().await.meta),
            Domain::OverviewAll => f(&mut self.overview_all.write().await.meta),
            Domain::Campaigns => f(&mut self.campaigns.write().await.meta),
            Domain::Revenue => f(&mut self.revenue.write().await.meta),
            Domain::Health => f(&mut self.health.write().await.meta),
        }
    }

    pub async fn get<T: DomainData>(&self) -> Option<Resolved<T>> {
        T::slot(self).read().await.entry.clone()
    }

    /// The stored value if it is still within its domain's stale window.
    pub async fn fresh<T: DomainData>(&self, now: Instant) -> Option<Resolved<T>> {
        let slot = T::slot(self).read().await;
        let fetched_at = slot.meta.fetched_at?;
        if now.saturating_duration_since(fetched_at) < T::DOMAIN.stale_after() {
            slot.entry.clone()
        } else {
            None
        }
    }

    /// Start a fetch for `domain`, attaching it if it was detached.
    pub async fn begin(&self, domain: Domain) -> Ticket {
        self.with_meta(domain, |meta| {
            meta.attached = true;
            Ticket {
                domain,
                generation: meta.generation,
            }
        })
        .await
    }

    /// Store a fetch result. Returns `false`, leaving the slot untouched, when
    /// the ticket predates an invalidate, detach or merge.
    pub async fn store<T: DomainData>(&self, ticket: Ticket, value: Resolved<T>) -> bool {
        debug_assert_eq!(ticket.domain, T::DOMAIN);
        let mut slot = T::slot(self).write().await;
        if slot.meta.generation != ticket.generation {
            tracing::debug!(
                domain = T::DOMAIN.key(),
                ticket = ticket.generation,
                current = slot.meta.generation,
                "discarding late response"
            );
            return false;
        }
        slot.meta.fetched_at = Some(Instant::now());
        slot.meta.source = Some(value.source);
        slot.entry = Some(value);
        true
    }

    /// Whether a refresh of `domain` is due at `now`. Detached domains are
    /// never due; a domain with no successful store yet always is.
    pub async fn is_due(&self, domain: Domain, now: Instant) -> bool {
        self.with_meta(domain, |meta| {
            meta.attached
                && meta
                    .fetched_at
                    .map_or(true, |at| {
                        now.saturating_duration_since(at) >= domain.refresh_interval()
                    })
        })
        .await
    }

    pub async fn is_attached(&self, domain: Domain) -> bool {
        self.with_meta(domain, |meta| meta.attached).await
    }

    /// Mark `domain` for refetch and drop any in-flight result. The current
    /// value stays readable until the refetch lands.
    pub async fn invalidate(&self, domain: Domain) {
        self.with_meta(domain, |meta| {
            meta.generation += 1;
            meta.fetched_at = None;
        })
        .await;
    }

    pub async fn invalidate_all(&self) {
        for domain in Domain::ALL {
            self.invalidate(domain).await;
        }
    }

    /// The view showing `domain` went away: stop refreshing it and drop any
    /// in-flight result. The next [`begin`](Self::begin) reattaches it.
    pub async fn detach(&self, domain: Domain) {
        self.with_meta(domain, |meta| {
            meta.generation += 1;
            meta.attached = false;
        })
        .await;
    }

    pub async fn fallback_in_use(&self, domain: Domain) -> bool {
        self.with_meta(domain, |meta| meta.source == Some(DataSource::Fallback))
            .await
    }

    pub async fn demo_mode(&self) -> DemoMode {
        DemoMode {
            overview: self.fallback_in_use(Domain::OverviewLatest).await,
            campaigns: self.fallback_in_use(Domain::Campaigns).await,
            revenue: self.fallback_in_use(Domain::Revenue).await,
        }
    }

    /// A freshly created snapshot becomes the latest and joins the front of
    /// the newest-first history.
    ///
    /// Merges count as a store: fetches already in flight are discarded and
    /// the merged value stands until the next refresh.
    pub async fn merge_overview(&self, created: Resolved<OverviewMetrics>) {
        {
            let mut latest = self.overview_latest.write().await;
            latest.meta.supersede();
            latest.meta.source = Some(created.source);
            latest.entry = Some(created.clone());
        }
        let mut all = self.overview_all.write().await;
        merge_into_list(&mut all, created, |list, record| list.insert(0, record));
    }

    pub async fn merge_campaign(&self, created: Resolved<CampaignConversion>) {
        let mut slot = self.campaigns.write().await;
        merge_into_list(&mut slot, created, Vec::push);
    }

    pub async fn merge_revenue(&self, created: Resolved<RevenueDataPoint>) {
        let mut slot = self.revenue.write().await;
        merge_into_list(&mut slot, created, Vec::push);
    }
}

/// Add one record to a list slot. An empty slot takes the record's source;
/// otherwise the list keeps its own.
fn merge_into_list<T: Clone>(
    slot: &mut Slot<Vec<T>>,
    created: Resolved<T>,
    place: impl FnOnce(&mut Vec<T>, T),
) {
    slot.meta.supersede();
    match slot.entry.as_mut() {
        Some(existing) => place(&mut existing.data, created.data),
        None => {
            slot.meta.source = Some(created.source);
            slot.entry = Some(Resolved {
                data: vec![created.data],
                source: created.source,
                resolved_at: created.resolved_at,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(name: &str) -> CampaignConversion {
        CampaignConversion {
            id: name.to_string(),
            campaign: name.to_string(),
            conversions: 10,
            date: Utc::now(),
        }
    }

    fn overview() -> OverviewMetrics {
        OverviewMetrics {
            id: "m".to_string(),
            revenue: 1.0,
            users: 1,
            conversions: 1,
            growth: 0.0,
            date: Utc::now(),
        }
    }

    #[test]
    fn intervals_match_domains() {
        assert_eq!(Domain::OverviewLatest.refresh_interval(), Duration::from_secs(30));
        assert_eq!(Domain::OverviewLatest.stale_after(), Duration::from_secs(10));
        assert_eq!(Domain::OverviewAll.refresh_interval(), Duration::from_secs(60));
        assert_eq!(Domain::Health.retry_policy().max_retries, 5);
        assert_eq!(Domain::Revenue.retry_policy().max_retries, 3);
    }

    #[tokio::test]
    async fn store_with_current_ticket_succeeds() {
        let cache = DashboardCache::new();
        let ticket = cache.begin(Domain::Campaigns).await;
        assert!(cache.store(ticket, Resolved::remote(vec![campaign("a")])).await);
        let got = cache.get::<Vec<CampaignConversion>>().await.expect("entry");
        assert_eq!(got.data.len(), 1);
        assert_eq!(got.source, DataSource::Remote);
    }

    #[tokio::test]
    async fn late_response_after_invalidate_is_discarded() {
        let cache = DashboardCache::new();
        let ticket = cache.begin(Domain::Campaigns).await;
        cache.invalidate(Domain::Campaigns).await;
        assert!(!cache.store(ticket, Resolved::remote(vec![campaign("late")])).await);
        assert!(cache.get::<Vec<CampaignConversion>>().await.is_none());
    }

    #[tokio::test]
    async fn detach_discards_in_flight_and_stops_refresh() {
        let cache = DashboardCache::new();
        let ticket = cache.begin(Domain::Revenue).await;
        assert!(cache.is_due(Domain::Revenue, Instant::now()).await);
        cache.detach(Domain::Revenue).await;
        assert!(!cache.store(ticket, Resolved::remote(Vec::<RevenueDataPoint>::new())).await);
        assert!(!cache.is_due(Domain::Revenue, Instant::now()).await);
        cache.begin(Domain::Revenue).await;
        assert!(cache.is_attached(Domain::Revenue).await);
    }

    #[tokio::test(start_paused = true)]
    async fn due_after_refresh_interval() {
        let cache = DashboardCache::new();
        let ticket = cache.begin(Domain::OverviewLatest).await;
        cache.store(ticket, Resolved::remote(overview())).await;
        assert!(!cache.is_due(Domain::OverviewLatest, Instant::now()).await);
        assert!(cache.fresh::<OverviewMetrics>(Instant::now()).await.is_some());

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(cache.fresh::<OverviewMetrics>(Instant::now()).await.is_none());
        assert!(!cache.is_due(Domain::OverviewLatest, Instant::now()).await);

        tokio::time::advance(Duration::from_secs(20)).await;
        assert!(cache.is_due(Domain::OverviewLatest, Instant::now()).await);
    }

    #[tokio::test]
    async fn merges_append_and_keep_list_source() {
        let cache = DashboardCache::new();
        cache.merge_campaign(Resolved::fallback(campaign("first"))).await;
        assert!(cache.fallback_in_use(Domain::Campaigns).await);

        let ticket = cache.begin(Domain::Campaigns).await;
        cache
            .store(ticket, Resolved::remote(vec![campaign("a"), campaign("b")]))
            .await;
        cache.merge_campaign(Resolved::fallback(campaign("c"))).await;
        let got = cache.get::<Vec<CampaignConversion>>().await.expect("entry");
        let names: Vec<&str> = got.data.iter().map(|c| c.campaign.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(got.source, DataSource::Remote);
    }

    #[tokio::test]
    async fn merge_outdates_fetches_in_flight() {
        let cache = DashboardCache::new();
        let ticket = cache.begin(Domain::Campaigns).await;
        cache.merge_campaign(Resolved::fallback(campaign("echo"))).await;

        let stored = cache
            .store(ticket, Resolved::remote(vec![campaign("stale")]))
            .await;

        assert!(!stored);
        let got = cache.get::<Vec<CampaignConversion>>().await.expect("entry");
        assert_eq!(got.data[0].campaign, "echo");
        assert!(!cache.is_due(Domain::Campaigns, Instant::now()).await);
    }

    #[tokio::test]
    async fn overview_merge_sets_latest_and_prepends_history() {
        let cache = DashboardCache::new();
        let ticket = cache.begin(Domain::OverviewAll).await;
        let older = overview();
        cache.store(ticket, Resolved::remote(vec![older.clone()])).await;

        let mut created = overview();
        created.id = "new".to_string();
        cache.merge_overview(Resolved::remote(created.clone())).await;

        let latest = cache.get::<OverviewMetrics>().await.expect("latest");
        assert_eq!(latest.data.id, "new");
        let history = cache.get::<Vec<OverviewMetrics>>().await.expect("history");
        assert_eq!(history.data, vec![created, older]);
    }

    #[tokio::test]
    async fn demo_mode_tracks_fallback_domains() {
        let cache = DashboardCache::new();
        assert!(!cache.demo_mode().await.any());
        let ticket = cache.begin(Domain::Revenue).await;
        cache
            .store(ticket, Resolved::fallback(Vec::<RevenueDataPoint>::new()))
            .await;
        let demo = cache.demo_mode().await;
        assert!(demo.revenue && demo.any());
        assert!(!demo.campaigns && !demo.overview);

        let ticket = cache.begin(Domain::Revenue).await;
        cache
            .store(ticket, Resolved::remote(Vec::<RevenueDataPoint>::new()))
            .await;
        assert!(!cache.demo_mode().await.any());
    }
}
