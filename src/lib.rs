//! Escalation Desk Library
//!
//! Wallet escalation workflow for the cybercrime investigation API:
//! - Search a wallet and inspect its risk aggregate and evidence
//! - Freeze / unfreeze it with a mandatory reason and recorded actor
//! - Browse frozen and unfrozen wallets, optionally polled
//! - Build a police report through a forward-gated wizard with sealed evidence

pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::escalation::{EscalationController, Notice, NoticeLevel, ReasonModal, Tab};
pub use crate::core::freeze::{FreezeService, FreezeStateMachine, Transition};
pub use crate::core::risk_score::RiskBand;
pub use crate::core::wizard::{
    load_case, CaseFile, DispatchedReport, ReportLog, ReportWizard, WizardStep,
};
pub use models::config::DeskConfig;
pub use models::errors::{AppError, AppResult, ErrorCode, ErrorKind};
pub use models::types::{
    Actor, EvidenceItem, FreezeState, FrozenWalletEntry, PoliceStation, UnfrozenWalletEntry,
    Wallet, WalletData,
};
pub use providers::wallets::{WalletApi, WalletApiClient};
pub use utils::inflight::{InFlight, Section};
pub use utils::poller::{PollState, PollSubscription, Poller};
pub use utils::stations::StationDirectory;
