//! Core Module - escalation workflow
//!
//! Freeze state machine, report wizard, escalation screen controller and risk bands.

pub mod escalation;
pub mod freeze;
pub mod risk_score;
pub mod wizard;

pub use escalation::*;
pub use freeze::*;
pub use risk_score::*;
pub use wizard::*;
