use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::DashboardApi;
use crate::resolver::Resolver;

/// Background task that keeps attached domains fresh.
///
/// Every `tick` it re-resolves the domains whose refresh interval has
/// elapsed. [`force_refresh`](Self::force_refresh) invalidates everything and
/// wakes the loop without waiting for the next tick.
pub struct RefreshScheduler<A> {
    resolver: Arc<Resolver<A>>,
    wake: Arc<Notify>,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl<A: DashboardApi> RefreshScheduler<A> {
    pub fn spawn(resolver: Arc<Resolver<A>>, tick: Duration) -> Self {
        let wake = Arc::new(Notify::new());
        let stop = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(run_refresh_loop(
            Arc::clone(&resolver),
            tick,
            Arc::clone(&wake),
            Arc::clone(&stop),
        ));
        Self {
            resolver,
            wake,
            stop,
            handle,
        }
    }

    pub async fn force_refresh(&self) {
        self.resolver.cache().invalidate_all().await;
        self.wake.notify_one();
    }

    /// Stop the loop and wait for an in-progress pass to finish.
    pub async fn shutdown(self) {
        self.stop.store(true, Ordering::SeqCst);
        self.wake.notify_one();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "refresh task ended abnormally");
        }
    }
}

async fn run_refresh_loop<A: DashboardApi>(
    resolver: Arc<Resolver<A>>,
    tick: Duration,
    wake: Arc<Notify>,
    stop: Arc<AtomicBool>,
) {
    info!(tick_ms = tick.as_millis() as u64, "refresh scheduler started");
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = wake.notified() => {}
        }
        if stop.load(Ordering::SeqCst) {
            break;
        }
        let refreshed = resolver.refresh_due().await;
        if refreshed > 0 {
            debug!(refreshed, "refresh pass complete");
        }
    }
    info!("refresh scheduler stopped");
}
