//! Scoped polling subscriptions
//!
//! A list view that refreshes on a timer holds a [`PollSubscription`]. The
//! timer task lives exactly as long as the subscription: `stop()` or dropping
//! it tears the task down, so no timer outlives its view.
//!
//! Each successful fetch replaces the published data wholesale. A failed fetch
//! records the error and leaves the previous data in place; old and new
//! results are never merged.

use chrono::{NaiveDateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::models::errors::AppResult;
use crate::utils::inflight::{InFlight, Section};

/// Latest state published by a poller
#[derive(Debug)]
pub struct PollState<T> {
    /// Last successfully fetched data
    pub data: Option<Arc<T>>,
    /// User-facing message of the most recent failure, cleared on success
    pub last_error: Option<String>,
    /// When `data` was fetched
    pub refreshed_at: Option<NaiveDateTime>,
    /// Completed ticks, successful or not
    pub ticks: u64,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            last_error: None,
            refreshed_at: None,
            ticks: 0,
        }
    }
}

impl<T> Clone for PollState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            last_error: self.last_error.clone(),
            refreshed_at: self.refreshed_at,
            ticks: self.ticks,
        }
    }
}

/// Starts polling tasks
pub struct Poller;

impl Poller {
    /// Start polling `fetch` every `interval`, first tick immediately.
    ///
    /// When `tracker` is given, a tick is skipped while `section` already has a
    /// request in flight (e.g. a manual refresh).
    pub fn start<T, F, Fut>(
        name: &'static str,
        interval: Duration,
        tracker: Option<(InFlight, Section)>,
        mut fetch: F,
    ) -> PollSubscription<T>
    where
        T: Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send,
    {
        let (tx, rx) = watch::channel(PollState::default());

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let _guard = match &tracker {
                    Some((inflight, section)) => match inflight.begin(*section) {
                        Ok(guard) => Some(guard),
                        Err(_) => {
                            debug!("⏭️ {}: refresh already in flight, skipping tick", name);
                            continue;
                        }
                    },
                    None => None,
                };

                let result = fetch().await;
                tx.send_modify(|state| {
                    state.ticks += 1;
                    match result {
                        Ok(data) => {
                            state.data = Some(Arc::new(data));
                            state.last_error = None;
                            state.refreshed_at = Some(Utc::now().naive_utc());
                        }
                        Err(e) => {
                            warn!("⚠️ {} refresh failed: {}", name, e);
                            state.last_error = Some(e.user_message());
                        }
                    }
                });

                if tx.is_closed() {
                    debug!("{}: no observers left, stopping", name);
                    break;
                }
            }
        });

        info!("⏱️ Polling {} every {:?}", name, interval);

        PollSubscription {
            name,
            rx,
            handle: Some(handle),
        }
    }
}

/// Live polling subscription. Dropping it stops the timer.
pub struct PollSubscription<T> {
    name: &'static str,
    rx: watch::Receiver<PollState<T>>,
    handle: Option<JoinHandle<()>>,
}

impl<T> PollSubscription<T> {
    /// Snapshot of the latest published state
    pub fn current(&self) -> PollState<T> {
        self.rx.borrow().clone()
    }

    /// Wait until the next tick completes and return its state
    pub async fn changed(&mut self) -> Option<PollState<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop polling and wait for the task to wind down
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            info!("🛑 Polling {} stopped", self.name);
        }
    }
}

impl<T> Drop for PollSubscription<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("🛑 Polling {} dropped", self.name);
        }
    }
}
