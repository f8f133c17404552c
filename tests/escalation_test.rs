//! Escalation screen workflow against the stub API

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{StubBackend, ACTIVE_ADDRESS, FROZEN_ADDRESS, UNFROZEN_ADDRESS};
use escalation_desk::{
    Actor, ErrorCode, ErrorKind, EscalationController, InFlight, NoticeLevel, RiskBand, Section,
    Tab, Transition,
};

fn actor() -> Actor {
    Actor::new("admin@cybercrime.gov")
}

#[tokio::test]
async fn test_search_unknown_wallet_shows_not_found() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.set_search_input("0xABC");
    let err = desk.search().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(desk.wallet_data().is_none());
    assert!(desk.notice_is_not_found());
    assert_eq!(desk.notice().unwrap().message, "Wallet 0xABC not found");
    assert_eq!(StubBackend::count(&stub.calls.search), 1);
}

#[tokio::test]
async fn test_blank_search_makes_no_request() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.set_search_input("   ");
    assert!(!desk.can_search());
    let err = desk.search().await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationBlankWallet);
    assert_eq!(StubBackend::count(&stub.calls.search), 0);
}

#[tokio::test]
async fn test_search_displays_wallet_and_risk() {
    let (_stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.set_search_input(format!("  {}  ", ACTIVE_ADDRESS));
    desk.search().await.unwrap();

    let data = desk.wallet_data().unwrap();
    assert_eq!(data.wallet.id, 42);
    assert!(!data.wallet.is_frozen);
    assert_eq!(data.evidence.len(), 2);
    assert_eq!(desk.risk_band(), Some(RiskBand::Critical));
    assert!(desk.notice().is_none());
    assert!(!desk.is_loading(Section::Search));
}

#[tokio::test]
async fn test_failed_search_clears_previous_result() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.set_search_input(ACTIVE_ADDRESS);
    desk.search().await.unwrap();
    assert!(desk.wallet_data().is_some());

    stub.fail_search.store(true, Ordering::SeqCst);
    let err = desk.search().await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ApiServerError);
    assert!(desk.wallet_data().is_none());
    let notice = desk.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("try again"));
}

#[tokio::test]
async fn test_freeze_updates_wallet_and_refetches_viewed_list() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.select_tab(Tab::Frozen).await.unwrap();
    assert_eq!(desk.frozen_wallets().unwrap().len(), 1);
    assert_eq!(StubBackend::count(&stub.calls.frozen_list), 1);

    desk.set_search_input(ACTIVE_ADDRESS);
    desk.search().await.unwrap();
    desk.open_freeze_modal().unwrap();
    assert_eq!(desk.modal().unwrap().transition, Transition::Freeze);
    desk.set_modal_reason("High risk ML score");
    assert!(desk.can_submit_modal());

    desk.submit_modal(&actor()).await.unwrap();

    let wallet = &desk.wallet_data().unwrap().wallet;
    assert_eq!(wallet.id, 42);
    assert!(wallet.is_frozen);
    assert_eq!(wallet.frozen_by.as_deref(), Some("admin@cybercrime.gov"));
    assert_eq!(wallet.freeze_reason.as_deref(), Some("High risk ML score"));
    assert!(wallet.frozen_at.is_some());
    assert!(desk.modal().is_none());

    assert_eq!(StubBackend::count(&stub.calls.freeze), 1);
    assert_eq!(StubBackend::count(&stub.calls.frozen_list), 2);
    let frozen = desk.frozen_wallets().unwrap();
    assert_eq!(frozen.len(), 2);
    assert!(frozen.iter().any(|row| row.id == 42));
    assert_eq!(desk.notice().unwrap().level, NoticeLevel::Info);
}

#[tokio::test]
async fn test_freeze_on_search_tab_does_not_fetch_lists() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.set_search_input(ACTIVE_ADDRESS);
    desk.search().await.unwrap();
    desk.open_freeze_modal().unwrap();
    desk.set_modal_reason("Mixer activity");
    desk.submit_modal(&actor()).await.unwrap();

    assert_eq!(StubBackend::count(&stub.calls.frozen_list), 0);
    assert_eq!(StubBackend::count(&stub.calls.unfrozen_list), 0);
    // Detail refetched once after the freeze
    assert_eq!(StubBackend::count(&stub.calls.search), 2);
}

#[tokio::test]
async fn test_unfreeze_with_blank_reason_sends_nothing() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.set_search_input(FROZEN_ADDRESS);
    desk.search().await.unwrap();
    desk.open_unfreeze_modal().unwrap();
    desk.set_modal_reason("   ");

    assert!(!desk.can_submit_modal());
    let err = desk.submit_modal(&actor()).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationBlankReason);
    assert_eq!(StubBackend::count(&stub.calls.unfreeze), 0);
    assert!(desk.wallet_data().unwrap().wallet.is_frozen);
    assert!(desk.modal().is_some());
}

#[tokio::test]
async fn test_refreeze_is_conflict_and_keeps_freeze_fields() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.set_search_input(FROZEN_ADDRESS);
    desk.search().await.unwrap();
    let before = desk.wallet_data().unwrap().wallet.clone();

    let err = desk.open_freeze_modal().unwrap_err();

    assert_eq!(err.code, ErrorCode::WalletAlreadyFrozen);
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(desk.modal().is_none());
    assert_eq!(desk.wallet_data().unwrap().wallet, before);
    assert_eq!(StubBackend::count(&stub.calls.freeze), 0);
    assert_eq!(stub.wallet(7).frozen_by.as_deref(), Some("det.smith@cybercrime.gov"));
}

#[tokio::test]
async fn test_server_conflict_leaves_state_and_skips_refresh() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.select_tab(Tab::Frozen).await.unwrap();
    desk.set_search_input(ACTIVE_ADDRESS);
    desk.search().await.unwrap();
    desk.open_freeze_modal().unwrap();
    desk.set_modal_reason("High risk ML score");

    // Another operator freezes the wallet in the meantime
    {
        let mut records = stub.records.lock().unwrap();
        let record = records.iter_mut().find(|r| r.wallet.id == 42).unwrap();
        record.wallet.is_frozen = true;
        record.wallet.frozen_by = Some("det.smith@cybercrime.gov".into());
    }

    let err = desk.submit_modal(&actor()).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::WalletAlreadyFrozen);
    assert!(!desk.wallet_data().unwrap().wallet.is_frozen);
    assert!(desk.wallet_data().unwrap().wallet.frozen_by.is_none());
    assert_eq!(desk.notice().unwrap().code, Some("WALLET_ALREADY_FROZEN"));
    assert_eq!(StubBackend::count(&stub.calls.search), 1);
    assert_eq!(StubBackend::count(&stub.calls.frozen_list), 1);
}

#[tokio::test]
async fn test_unfreeze_records_actor_and_moves_lists() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.select_tab(Tab::Unfrozen).await.unwrap();
    assert_eq!(desk.unfrozen_wallets().unwrap().len(), 1);

    desk.set_search_input(FROZEN_ADDRESS);
    desk.search().await.unwrap();
    desk.open_unfreeze_modal().unwrap();
    desk.set_modal_reason("Court order lifted");
    desk.submit_modal(&Actor::new("inspector.white@cybercrime.gov")).await.unwrap();

    let wallet = &desk.wallet_data().unwrap().wallet;
    assert!(!wallet.is_frozen);
    assert_eq!(wallet.unfrozen_by.as_deref(), Some("inspector.white@cybercrime.gov"));
    assert_eq!(wallet.unfreeze_reason.as_deref(), Some("Court order lifted"));

    assert_eq!(StubBackend::count(&stub.calls.unfrozen_list), 2);
    assert_eq!(desk.unfrozen_wallets().unwrap().len(), 2);
}

#[tokio::test]
async fn test_freeze_after_unfreeze_clears_unfreeze_fields() {
    let (_stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.set_search_input(UNFROZEN_ADDRESS);
    desk.search().await.unwrap();
    assert!(desk.wallet_data().unwrap().wallet.unfrozen_by.is_some());

    desk.open_freeze_modal().unwrap();
    desk.set_modal_reason("New mixer activity");
    desk.submit_modal(&actor()).await.unwrap();

    let wallet = &desk.wallet_data().unwrap().wallet;
    assert!(wallet.is_frozen);
    assert!(wallet.unfrozen_by.is_none());
    assert!(wallet.unfreeze_reason.is_none());
    assert!(wallet.unfrozen_at.is_none());
}

#[tokio::test]
async fn test_failed_list_refresh_keeps_previous_rows() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.select_tab(Tab::Frozen).await.unwrap();
    let before = desk.frozen_wallets().unwrap().to_vec();

    stub.fail_lists.store(true, Ordering::SeqCst);
    let err = desk.refresh_active_list().await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ApiServerError);
    assert_eq!(desk.frozen_wallets().unwrap(), before.as_slice());
    assert_eq!(desk.notice().unwrap().code, Some("API_SERVER_ERROR"));
}

#[tokio::test]
async fn test_refresh_failure_after_freeze_is_a_warning() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.select_tab(Tab::Frozen).await.unwrap();
    desk.set_search_input(ACTIVE_ADDRESS);
    desk.search().await.unwrap();
    desk.open_freeze_modal().unwrap();
    desk.set_modal_reason("High risk ML score");

    stub.fail_lists.store(true, Ordering::SeqCst);
    desk.submit_modal(&actor()).await.unwrap();

    assert!(desk.wallet_data().unwrap().wallet.is_frozen);
    assert!(stub.wallet(42).is_frozen);
    let notice = desk.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert!(notice.message.contains("refresh failed"));
    assert_eq!(desk.frozen_wallets().unwrap().len(), 1);
}

#[tokio::test]
async fn test_modal_requires_a_loaded_wallet() {
    let (_stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    let err = desk.open_freeze_modal().unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationNoSelection);
    assert!(!desk.can_submit_modal());
}

#[tokio::test]
async fn test_section_in_flight_blocks_duplicate_submit() {
    let (stub, client) = common::start().await;
    let mut desk = EscalationController::new(client);

    desk.set_search_input(ACTIVE_ADDRESS);
    desk.search().await.unwrap();
    desk.open_freeze_modal().unwrap();
    desk.set_modal_reason("High risk ML score");

    let held = desk.inflight().begin(Section::Freeze).unwrap();
    assert!(!desk.can_submit_modal());
    let err = desk.submit_modal(&actor()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ActionInFlight);
    assert_eq!(StubBackend::count(&stub.calls.freeze), 0);

    drop(held);
    assert!(desk.can_submit_modal());
}

#[tokio::test]
async fn test_refresh_after_freeze_waits_for_busy_poll() {
    let (stub, client) = common::start().await;
    let inflight = InFlight::new();
    let mut desk = EscalationController::with_tracker(client, inflight.clone());

    desk.select_tab(Tab::Frozen).await.unwrap();
    desk.set_search_input(ACTIVE_ADDRESS);
    desk.search().await.unwrap();
    desk.open_freeze_modal().unwrap();
    desk.set_modal_reason("High risk ML score");

    // A poll tick holds both refresh sections while the freeze goes out
    let list_tick = inflight.begin(Section::FrozenList).unwrap();
    let search_tick = inflight.begin(Section::Search).unwrap();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(search_tick);
        drop(list_tick);
    });

    desk.submit_modal(&actor()).await.unwrap();

    assert_eq!(StubBackend::count(&stub.calls.freeze), 1);
    assert_eq!(StubBackend::count(&stub.calls.search), 2);
    assert_eq!(StubBackend::count(&stub.calls.frozen_list), 2);
    assert_eq!(desk.frozen_wallets().unwrap().len(), 2);
    assert!(desk.wallet_data().unwrap().wallet.is_frozen);
    assert_eq!(desk.notice().unwrap().level, NoticeLevel::Info);
    assert!(!inflight.is_busy(Section::FrozenList));
}
