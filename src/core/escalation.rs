//! Escalation Controller
//!
//! Drives the escalations screen: search a wallet, inspect it, freeze or
//! unfreeze it through a reason dialog, and browse the frozen / unfrozen lists.
//!
//! Every action catches its own error and records a [`Notice`] for the
//! operator; nothing propagates far enough to tear the view down. State only
//! changes after the server confirms. Refreshes triggered by a transition are
//! issued strictly after the transition succeeded.

use tracing::{info, warn};

use crate::core::freeze::{validate_reason, FreezeService, Transition};
use crate::core::risk_score::RiskBand;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{Actor, FreezeState, FrozenWalletEntry, UnfrozenWalletEntry, WalletData};
use crate::providers::wallets::WalletApi;
use crate::utils::inflight::{InFlight, InFlightGuard, Section};

/// Screen tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Search,
    Frozen,
    Unfrozen,
}

/// Reason dialog for a pending transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonModal {
    pub transition: Transition,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Message shown to the operator after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub code: Option<&'static str>,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            code: None,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            code: None,
            message: message.into(),
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        Self {
            level: NoticeLevel::Error,
            code: Some(err.code_str()),
            message: err.user_message(),
        }
    }
}

/// How a request claims its section
#[derive(Debug, Clone, Copy)]
enum Acquire {
    /// Reject with `ACTION_IN_FLIGHT` if the section is busy
    FailFast,
    /// Queue behind the current holder
    Wait,
}

fn section_for(transition: Transition) -> Section {
    match transition {
        Transition::Freeze => Section::Freeze,
        Transition::Unfreeze => Section::Unfreeze,
    }
}

/// State and actions of the escalations screen
pub struct EscalationController<C> {
    api: C,
    inflight: InFlight,
    search_input: String,
    wallet_data: Option<WalletData>,
    tab: Tab,
    frozen: Option<Vec<FrozenWalletEntry>>,
    unfrozen: Option<Vec<UnfrozenWalletEntry>>,
    modal: Option<ReasonModal>,
    notice: Option<Notice>,
}

impl<C: WalletApi> EscalationController<C> {
    pub fn new(api: C) -> Self {
        Self::with_tracker(api, InFlight::new())
    }

    /// Share an in-flight tracker with pollers of the same lists
    pub fn with_tracker(api: C, inflight: InFlight) -> Self {
        Self {
            api,
            inflight,
            search_input: String::new(),
            wallet_data: None,
            tab: Tab::Search,
            frozen: None,
            unfrozen: None,
            modal: None,
            notice: None,
        }
    }

    // ============================================
    // View state
    // ============================================

    pub fn api(&self) -> &C {
        &self.api
    }

    pub fn inflight(&self) -> &InFlight {
        &self.inflight
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn wallet_data(&self) -> Option<&WalletData> {
        self.wallet_data.as_ref()
    }

    /// Band of the displayed wallet's risk score
    pub fn risk_band(&self) -> Option<RiskBand> {
        self.wallet_data
            .as_ref()
            .map(|d| RiskBand::from_score(d.effective_risk_score()))
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn frozen_wallets(&self) -> Option<&[FrozenWalletEntry]> {
        self.frozen.as_deref()
    }

    pub fn unfrozen_wallets(&self) -> Option<&[UnfrozenWalletEntry]> {
        self.unfrozen.as_deref()
    }

    pub fn modal(&self) -> Option<&ReasonModal> {
        self.modal.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_loading(&self, section: Section) -> bool {
        self.inflight.is_busy(section)
    }

    /// Record a failure as the current notice and hand it back
    fn surface<T>(&mut self, result: AppResult<T>) -> AppResult<T> {
        if let Err(e) = &result {
            warn!("⚠️ {}", e);
            self.notice = Some(Notice::from_error(e));
        }
        result
    }

    // ============================================
    // Search
    // ============================================

    pub fn set_search_input(&mut self, input: impl Into<String>) {
        self.search_input = input.into();
    }

    pub fn can_search(&self) -> bool {
        !self.search_input.trim().is_empty() && !self.is_loading(Section::Search)
    }

    /// Look up the wallet in the search box
    pub async fn search(&mut self) -> AppResult<()> {
        let address = self.search_input.trim().to_string();
        let result = self.fetch_wallet(&address).await;
        self.surface(result)
    }

    async fn fetch_wallet(&mut self, address: &str) -> AppResult<()> {
        if address.is_empty() {
            return Err(AppError::blank_wallet());
        }
        let _guard = self.inflight.begin(Section::Search)?;

        match self.api.search_wallet(address).await {
            Ok(data) => {
                self.wallet_data = Some(data);
                self.notice = None;
                Ok(())
            }
            Err(e) => {
                // The old record belongs to a different query; never show it as this result
                self.wallet_data = None;
                self.modal = None;
                Err(e)
            }
        }
    }

    /// Re-fetch the displayed wallet
    pub async fn refresh_wallet_detail(&mut self) -> AppResult<()> {
        self.fetch_wallet_detail(Acquire::FailFast).await
    }

    async fn fetch_wallet_detail(&mut self, acquire: Acquire) -> AppResult<()> {
        let Some(address) = self.wallet_data.as_ref().map(|d| d.wallet.address.clone()) else {
            return Ok(());
        };
        let _guard = self.acquire(Section::Search, acquire).await?;
        let data = self.api.search_wallet(&address).await?;
        self.wallet_data = Some(data);
        Ok(())
    }

    // ============================================
    // Freeze / unfreeze dialog
    // ============================================

    pub fn open_freeze_modal(&mut self) -> AppResult<()> {
        let result = self.open_modal(Transition::Freeze);
        self.surface(result)
    }

    pub fn open_unfreeze_modal(&mut self) -> AppResult<()> {
        let result = self.open_modal(Transition::Unfreeze);
        self.surface(result)
    }

    fn open_modal(&mut self, transition: Transition) -> AppResult<()> {
        let data = self.wallet_data.as_ref().ok_or_else(|| {
            AppError::new(ErrorCode::ValidationNoSelection, "Search for a wallet first")
        })?;
        let state = data.wallet.freeze_state();
        if state != transition.from_state() {
            return Err(match state {
                FreezeState::Frozen => AppError::already_frozen("Wallet is already frozen"),
                FreezeState::Active => AppError::not_frozen("Wallet is not frozen"),
            });
        }
        self.modal = Some(ReasonModal {
            transition,
            reason: String::new(),
        });
        Ok(())
    }

    pub fn set_modal_reason(&mut self, reason: impl Into<String>) {
        if let Some(modal) = self.modal.as_mut() {
            modal.reason = reason.into();
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Submit button state: reason present and no request in flight
    pub fn can_submit_modal(&self) -> bool {
        match &self.modal {
            Some(modal) => {
                !modal.reason.trim().is_empty()
                    && !self.is_loading(section_for(modal.transition))
            }
            None => false,
        }
    }

    /// Confirm the dialog as `actor`, then refresh what is on screen
    pub async fn submit_modal(&mut self, actor: &Actor) -> AppResult<()> {
        let result = self.run_transition(actor).await;
        let result = self.surface(result);
        if result.is_ok() {
            self.refresh_after_transition().await;
        }
        result
    }

    async fn run_transition(&mut self, actor: &Actor) -> AppResult<()> {
        let modal = self.modal.clone().ok_or_else(|| {
            AppError::new(ErrorCode::ValidationNoSelection, "No freeze or unfreeze in progress")
        })?;
        validate_reason(&modal.reason)?;

        let _guard = self.inflight.begin(section_for(modal.transition))?;
        let data = self.wallet_data.as_mut().ok_or_else(|| {
            AppError::new(ErrorCode::ValidationNoSelection, "Search for a wallet first")
        })?;

        FreezeService::new(&self.api)
            .transition(&mut data.wallet, modal.transition, &modal.reason, actor)
            .await?;

        self.modal = None;
        self.notice = Some(Notice::info(match modal.transition {
            Transition::Freeze => format!("Wallet {} frozen", data.wallet.address),
            Transition::Unfreeze => format!("Wallet {} unfrozen", data.wallet.address),
        }));
        Ok(())
    }

    /// Refresh the wallet detail, then the list being viewed.
    ///
    /// The transition already succeeded; a refresh failure is only a warning.
    /// A section held elsewhere (a poll tick) is waited for, not skipped.
    async fn refresh_after_transition(&mut self) {
        let mut failures = Vec::new();

        if let Err(e) = self.fetch_wallet_detail(Acquire::Wait).await {
            warn!("⚠️ Wallet detail refresh failed: {}", e);
            failures.push(e.user_message());
        }
        if matches!(self.tab, Tab::Frozen | Tab::Unfrozen) {
            if let Err(e) = self.load_list(self.tab, Acquire::Wait).await {
                warn!("⚠️ List refresh failed: {}", e);
                failures.push(e.user_message());
            }
        }

        if !failures.is_empty() {
            let done = self
                .notice
                .as_ref()
                .map(|n| n.message.clone())
                .unwrap_or_default();
            self.notice = Some(Notice::warning(format!(
                "{} (refresh failed: {})",
                done,
                failures.join("; ")
            )));
        }
    }

    // ============================================
    // Lists
    // ============================================

    /// Switch tabs; list tabs fetch fresh data
    pub async fn select_tab(&mut self, tab: Tab) -> AppResult<()> {
        self.tab = tab;
        if tab == Tab::Search {
            return Ok(());
        }
        let result = self.load_list(tab, Acquire::FailFast).await;
        self.surface(result)
    }

    /// Re-fetch the list of the active tab
    pub async fn refresh_active_list(&mut self) -> AppResult<()> {
        if self.tab == Tab::Search {
            return Ok(());
        }
        let result = self.load_list(self.tab, Acquire::FailFast).await;
        self.surface(result)
    }

    /// Replace the list wholesale on success; keep the previous one on failure
    async fn load_list(&mut self, tab: Tab, acquire: Acquire) -> AppResult<()> {
        match tab {
            Tab::Frozen => {
                let _guard = self.acquire(Section::FrozenList, acquire).await?;
                let rows = self.api.list_frozen_wallets().await?;
                info!("🔒 Frozen wallets: {}", rows.len());
                self.frozen = Some(rows);
            }
            Tab::Unfrozen => {
                let _guard = self.acquire(Section::UnfrozenList, acquire).await?;
                let rows = self.api.list_unfrozen_wallets().await?;
                info!("🔓 Unfrozen wallets: {}", rows.len());
                self.unfrozen = Some(rows);
            }
            Tab::Search => {}
        }
        Ok(())
    }

    async fn acquire(&self, section: Section, acquire: Acquire) -> AppResult<InFlightGuard> {
        match acquire {
            Acquire::FailFast => self.inflight.begin(section),
            Acquire::Wait => Ok(self.inflight.begin_when_idle(section).await),
        }
    }

    /// Whether the current notice came from a not-found lookup
    pub fn notice_is_not_found(&self) -> bool {
        self.notice
            .as_ref()
            .and_then(|n| n.code)
            .is_some_and(|code| code == ErrorCode::WalletNotFound.as_str())
    }
}
