//! In-flight request tracking per UI section
//!
//! Each section (search, freeze, list refresh, ...) may have at most one
//! request outstanding. The triggering control is disabled while its section
//! is busy, and a second submit is rejected with `ACTION_IN_FLIGHT`.
//! Thread-safe via DashMap so pollers and the controller share one tracker.
//! Follow-up work that must not be lost can wait for the section instead.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tracing::debug;

use crate::models::errors::{AppError, AppResult};

/// Independently tracked loading sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Search,
    Freeze,
    Unfreeze,
    FrozenList,
    UnfrozenList,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Search => "Wallet search",
            Section::Freeze => "Freeze",
            Section::Unfreeze => "Unfreeze",
            Section::FrozenList => "Frozen wallets refresh",
            Section::UnfrozenList => "Unfrozen wallets refresh",
        }
    }
}

/// Shared registry of busy sections
#[derive(Clone, Default)]
pub struct InFlight {
    busy: Arc<DashMap<Section, Instant>>,
    idle: Arc<Notify>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `section` busy until the returned guard is dropped
    pub fn begin(&self, section: Section) -> AppResult<InFlightGuard> {
        use dashmap::mapref::entry::Entry;

        match self.busy.entry(section) {
            Entry::Occupied(_) => Err(AppError::in_flight(section.as_str())),
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                debug!("⏳ {} started", section.as_str());
                Ok(InFlightGuard {
                    busy: self.busy.clone(),
                    idle: self.idle.clone(),
                    section,
                })
            }
        }
    }

    #[inline]
    pub fn is_busy(&self, section: Section) -> bool {
        self.busy.contains_key(&section)
    }

    /// Like [`begin`](Self::begin), but waits for the current holder of
    /// `section` to finish instead of failing
    pub async fn begin_when_idle(&self, section: Section) -> InFlightGuard {
        loop {
            // Register before checking so a release in between is not missed
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Ok(guard) = self.begin(section) {
                return guard;
            }
            debug!("⏸️ {} busy, waiting", section.as_str());
            notified.await;
        }
    }
}

/// Releases its section on drop, whatever the request outcome
pub struct InFlightGuard {
    busy: Arc<DashMap<Section, Instant>>,
    idle: Arc<Notify>,
    section: Section,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some((_, started)) = self.busy.remove(&self.section) {
            debug!(
                "✔️ {} finished in {:.1}ms",
                self.section.as_str(),
                started.elapsed().as_secs_f64() * 1000.0
            );
        }
        self.idle.notify_waiters();
    }
}
