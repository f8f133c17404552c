//! Freeze State Machine
//!
//! A wallet is either ACTIVE or FROZEN:
//! - ACTIVE → FROZEN via freeze(reason, actor)
//! - FROZEN → ACTIVE via unfreeze(reason, actor)
//!
//! Both transitions require a non-blank reason, checked before any request.
//! Repeating a transition is a conflict, never a no-op. The local wallet record
//! changes only after the server confirms; on failure it is left untouched.

use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    Actor, FreezeAck, FreezeRequest, FreezeState, UnfreezeRequest, Wallet,
};
use crate::providers::wallets::WalletApi;

/// Administrative transition on a wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Freeze,
    Unfreeze,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Freeze => "freeze",
            Transition::Unfreeze => "unfreeze",
        }
    }

    /// State the wallet must be in for this transition
    pub fn from_state(&self) -> FreezeState {
        match self {
            Transition::Freeze => FreezeState::Active,
            Transition::Unfreeze => FreezeState::Frozen,
        }
    }

    /// State after the transition
    pub fn to_state(&self) -> FreezeState {
        match self {
            Transition::Freeze => FreezeState::Frozen,
            Transition::Unfreeze => FreezeState::Active,
        }
    }
}

/// Reason text, trimmed; blank is a validation error
pub fn validate_reason(reason: &str) -> AppResult<&str> {
    let reason = reason.trim();
    if reason.is_empty() {
        Err(AppError::blank_reason())
    } else {
        Ok(reason)
    }
}

/// Pure transition rules
pub struct FreezeStateMachine;

impl FreezeStateMachine {
    /// Check that `transition` is allowed from `state`
    pub fn check(state: FreezeState, transition: Transition) -> AppResult<()> {
        if state == transition.from_state() {
            return Ok(());
        }
        Err(match transition {
            Transition::Freeze => AppError::already_frozen("Wallet is already frozen"),
            Transition::Unfreeze => AppError::not_frozen("Wallet is not frozen"),
        })
    }

    /// Apply a server-confirmed transition to the local record.
    ///
    /// A freeze clears the previous unfreeze fields; only the most recent
    /// unfreeze is ever retained.
    pub fn apply_confirmed(wallet: &mut Wallet, transition: Transition, ack: &FreezeAck) {
        match transition {
            Transition::Freeze => {
                wallet.is_frozen = true;
                wallet.frozen_by = ack.frozen_by.clone();
                wallet.freeze_reason = ack.freeze_reason.clone();
                wallet.frozen_at = ack.frozen_at;
                wallet.unfrozen_by = None;
                wallet.unfreeze_reason = None;
                wallet.unfrozen_at = None;
            }
            Transition::Unfreeze => {
                wallet.is_frozen = false;
                wallet.unfrozen_by = ack.unfrozen_by.clone();
                wallet.unfreeze_reason = ack.unfreeze_reason.clone();
                wallet.unfrozen_at = ack.unfrozen_at;
            }
        }
    }
}

/// Executes transitions against the wallet API
pub struct FreezeService<'a, C> {
    api: &'a C,
}

impl<'a, C: WalletApi> FreezeService<'a, C> {
    pub fn new(api: &'a C) -> Self {
        Self { api }
    }

    /// ACTIVE → FROZEN
    pub async fn freeze(&self, wallet: &mut Wallet, reason: &str, actor: &Actor) -> AppResult<FreezeAck> {
        self.transition(wallet, Transition::Freeze, reason, actor).await
    }

    /// FROZEN → ACTIVE
    pub async fn unfreeze(&self, wallet: &mut Wallet, reason: &str, actor: &Actor) -> AppResult<FreezeAck> {
        self.transition(wallet, Transition::Unfreeze, reason, actor).await
    }

    /// Validate, check state, call the API, then apply the confirmation.
    pub async fn transition(
        &self,
        wallet: &mut Wallet,
        transition: Transition,
        reason: &str,
        actor: &Actor,
    ) -> AppResult<FreezeAck> {
        let reason = validate_reason(reason)?;
        FreezeStateMachine::check(wallet.freeze_state(), transition)?;

        let result = match transition {
            Transition::Freeze => {
                let request = FreezeRequest {
                    freeze_reason: reason.to_string(),
                    frozen_by: actor.to_string(),
                };
                self.api.freeze_wallet(wallet.id, &request).await
            }
            Transition::Unfreeze => {
                let request = UnfreezeRequest {
                    unfreeze_reason: reason.to_string(),
                    unfrozen_by: actor.to_string(),
                };
                self.api.unfreeze_wallet(wallet.id, &request).await
            }
        };

        match result {
            Ok(ack) => {
                if ack.is_frozen != (transition.to_state() == FreezeState::Frozen) {
                    warn!(
                        "⚠️ Wallet {} {} acknowledged with is_frozen={}",
                        wallet.id,
                        transition.as_str(),
                        ack.is_frozen
                    );
                }
                FreezeStateMachine::apply_confirmed(wallet, transition, &ack);
                info!(
                    "{} Wallet {} is now {} (by {}: {})",
                    wallet.freeze_state().emoji(),
                    wallet.address,
                    wallet.freeze_state().as_str(),
                    actor,
                    reason
                );
                Ok(ack)
            }
            Err(e) => {
                warn!("❌ {} of wallet {} failed: {}", transition.as_str(), wallet.id, e);
                Err(e)
            }
        }
    }
}
