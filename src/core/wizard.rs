//! Police Report Wizard
//!
//! Four forward-gated steps:
//! 1. Wallet   - enter the wallet identifier (must be non-blank)
//! 2. Evidence - case file and evidence are attached, read-only
//! 3. Station  - pick exactly one police station
//! 4. Submit   - incident description (required) and internal notes
//!
//! Sending returns to step 1 with every field reset. The only backward move
//! is 4 → 3. Evidence attached in step 2 is sealed: there is no way to remove
//! or replace it for the rest of the run.

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{Actor, EvidenceItem, PoliceStation, WalletData};
use crate::providers::wallets::WalletApi;
use crate::utils::constants::REPORT_LOG_CAPACITY;

/// Wizard steps, ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Wallet = 1,
    Evidence = 2,
    Station = 3,
    Submit = 4,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::Wallet => "Wallet ID",
            WizardStep::Evidence => "Evidence",
            WizardStep::Station => "Select Station",
            WizardStep::Submit => "Submit Report",
        }
    }
}

/// Case data attached in step 2
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFile {
    pub case_id: String,
    pub wallet_address: String,
    pub risk_score: u8,
    pub ml_tags: Vec<String>,
    evidence: Arc<[EvidenceItem]>,
}

impl CaseFile {
    pub fn new(
        case_id: impl Into<String>,
        wallet_address: impl Into<String>,
        risk_score: u8,
        ml_tags: Vec<String>,
        evidence: Vec<EvidenceItem>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            wallet_address: wallet_address.into(),
            risk_score: risk_score.min(100),
            ml_tags,
            evidence: evidence.into(),
        }
    }

    /// Build a case from a wallet search result under a fresh case id
    pub fn from_wallet_data(data: &WalletData) -> Self {
        Self::new(
            new_case_id(),
            data.wallet.address.clone(),
            data.effective_risk_score(),
            data.ml_tags.clone(),
            data.evidence.clone(),
        )
    }

    pub fn evidence(&self) -> &[EvidenceItem] {
        &self.evidence
    }

    pub fn evidence_ids(&self) -> BTreeSet<i64> {
        self.evidence.iter().map(|e| e.id).collect()
    }
}

fn new_case_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("CASE-{}", id[..8].to_uppercase())
}

/// Report handed off when the wizard is sent
#[derive(Debug, Clone, Serialize)]
pub struct DispatchedReport {
    pub reference: Uuid,
    pub wallet_id: String,
    pub case_id: Option<String>,
    pub risk_score: Option<u8>,
    pub station: PoliceStation,
    pub description: String,
    pub internal_notes: Option<String>,
    pub evidence: Vec<EvidenceItem>,
    pub sent_by: Actor,
    pub sent_at: NaiveDateTime,
}

/// Wizard state for one report run
#[derive(Debug, Clone)]
pub struct ReportWizard {
    step: WizardStep,
    wallet_id: String,
    case: Option<CaseFile>,
    selected_station: Option<PoliceStation>,
    description: String,
    internal_notes: String,
}

impl Default for ReportWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Wallet,
            wallet_id: String::new(),
            case: None,
            selected_station: None,
            description: String::new(),
            internal_notes: String::new(),
        }
    }

    // ============================================
    // Accessors
    // ============================================

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }

    pub fn case(&self) -> Option<&CaseFile> {
        self.case.as_ref()
    }

    /// Attached evidence; empty until a case is attached
    pub fn evidence(&self) -> &[EvidenceItem] {
        self.case.as_ref().map(|c| c.evidence()).unwrap_or(&[])
    }

    pub fn selected_station(&self) -> Option<&PoliceStation> {
        self.selected_station.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn internal_notes(&self) -> &str {
        &self.internal_notes
    }

    // ============================================
    // Gates (mirror the disabled state of each button)
    // ============================================

    pub fn can_submit_wallet(&self) -> bool {
        self.step == WizardStep::Wallet && !self.wallet_id.trim().is_empty()
    }

    pub fn can_send(&self) -> bool {
        self.step == WizardStep::Submit
            && self.selected_station.is_some()
            && !self.description.trim().is_empty()
    }

    fn require_step(&self, expected: WizardStep, action: &str) -> AppResult<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(AppError::wrong_step(format!(
                "Cannot {} during step {} ({}); expected step {}",
                action,
                self.step.number(),
                self.step.label(),
                expected.number()
            )))
        }
    }

    // ============================================
    // Step 1: wallet
    // ============================================

    pub fn set_wallet_id(&mut self, wallet_id: impl Into<String>) -> AppResult<()> {
        self.require_step(WizardStep::Wallet, "edit the wallet id")?;
        self.wallet_id = wallet_id.into();
        Ok(())
    }

    /// 1 → 2
    pub fn submit_wallet(&mut self) -> AppResult<()> {
        self.require_step(WizardStep::Wallet, "submit the wallet id")?;
        let trimmed = self.wallet_id.trim();
        if trimmed.is_empty() {
            return Err(AppError::blank_wallet());
        }
        self.wallet_id = trimmed.to_string();
        self.step = WizardStep::Evidence;
        info!("📝 Report wizard: wallet {} → evidence", self.wallet_id);
        Ok(())
    }

    // ============================================
    // Step 2: evidence
    // ============================================

    /// Attach the case file. Allowed once, during step 2 only.
    pub fn attach_case(&mut self, case: CaseFile) -> AppResult<()> {
        self.require_step(WizardStep::Evidence, "attach evidence")?;
        if self.case.is_some() {
            return Err(AppError::new(
                ErrorCode::EvidenceSealed,
                "Evidence is already attached to this case and cannot be changed",
            ));
        }
        if !case.wallet_address.eq_ignore_ascii_case(&self.wallet_id) {
            warn!(
                "⚠️ Case wallet {} differs from entered wallet {}",
                case.wallet_address, self.wallet_id
            );
        }
        info!(
            "📎 {} attached with {} evidence item(s)",
            case.case_id,
            case.evidence().len()
        );
        self.case = Some(case);
        Ok(())
    }

    /// 2 → 3
    pub fn continue_to_station(&mut self) -> AppResult<()> {
        self.require_step(WizardStep::Evidence, "continue to station selection")?;
        self.step = WizardStep::Station;
        debug!("Report wizard: evidence → station");
        Ok(())
    }

    // ============================================
    // Step 3: station
    // ============================================

    /// 3 → 4
    pub fn select_station(&mut self, station: PoliceStation) -> AppResult<()> {
        self.require_step(WizardStep::Station, "select a station")?;
        info!("🏛️ Report wizard: station {} selected", station.name);
        self.selected_station = Some(station);
        self.step = WizardStep::Submit;
        Ok(())
    }

    // ============================================
    // Step 4: submit
    // ============================================

    /// 4 → 3
    pub fn back_to_station(&mut self) -> AppResult<()> {
        self.require_step(WizardStep::Submit, "go back to station selection")?;
        self.step = WizardStep::Station;
        Ok(())
    }

    pub fn set_description(&mut self, text: impl Into<String>) -> AppResult<()> {
        self.require_step(WizardStep::Submit, "edit the description")?;
        self.description = text.into();
        Ok(())
    }

    pub fn set_internal_notes(&mut self, text: impl Into<String>) -> AppResult<()> {
        self.require_step(WizardStep::Submit, "edit internal notes")?;
        self.internal_notes = text.into();
        Ok(())
    }

    /// Send the report and reset the wizard for a fresh case
    pub fn send(&mut self, actor: &Actor) -> AppResult<DispatchedReport> {
        self.require_step(WizardStep::Submit, "send the report")?;
        let station = self.selected_station.clone().ok_or_else(|| {
            AppError::new(ErrorCode::ValidationNoStation, "Select a police station")
        })?;
        let description = self.description.trim();
        if description.is_empty() {
            return Err(AppError::new(
                ErrorCode::ValidationBlankDescription,
                "Incident description is required",
            ));
        }
        let notes = self.internal_notes.trim();

        let report = DispatchedReport {
            reference: Uuid::new_v4(),
            wallet_id: self.wallet_id.clone(),
            case_id: self.case.as_ref().map(|c| c.case_id.clone()),
            risk_score: self.case.as_ref().map(|c| c.risk_score),
            station,
            description: description.to_string(),
            internal_notes: (!notes.is_empty()).then(|| notes.to_string()),
            evidence: self.evidence().to_vec(),
            sent_by: actor.clone(),
            sent_at: Utc::now().naive_utc(),
        };

        info!(
            "📨 Report {} for wallet {} sent to {} by {}",
            report.reference, report.wallet_id, report.station.name, actor
        );
        self.reset();
        Ok(report)
    }

    /// Abandon the run
    pub fn cancel(&mut self) {
        if self.step != WizardStep::Wallet || !self.wallet_id.is_empty() {
            debug!("Report wizard cancelled at step {}", self.step.number());
        }
        self.reset();
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Fetch the wallet's case data and attach it (step 2).
///
/// On failure the wizard stays in step 2 without evidence.
pub async fn load_case<'w, C: WalletApi>(
    api: &C,
    wizard: &'w mut ReportWizard,
) -> AppResult<&'w CaseFile> {
    wizard.require_step(WizardStep::Evidence, "load case data")?;
    if wizard.case.is_some() {
        return Err(AppError::new(
            ErrorCode::EvidenceSealed,
            "Evidence is already attached to this case and cannot be changed",
        ));
    }

    let data = api.search_wallet(wizard.wallet_id()).await?;
    wizard.attach_case(CaseFile::from_wallet_data(&data))?;
    wizard
        .case()
        .ok_or_else(|| AppError::new(ErrorCode::ResourceNotFound, "Case file missing"))
}

/// Recent reports of this session, newest first
#[derive(Debug, Clone)]
pub struct ReportLog {
    entries: VecDeque<DispatchedReport>,
    capacity: usize,
}

impl Default for ReportLog {
    fn default() -> Self {
        Self::with_capacity(REPORT_LOG_CAPACITY)
    }
}

impl ReportLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, report: DispatchedReport) {
        self.entries.push_front(report);
        self.entries.truncate(self.capacity);
    }

    pub fn recent(&self) -> impl Iterator<Item = &DispatchedReport> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
