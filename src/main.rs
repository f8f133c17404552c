//! Escalation Desk - operator console for wallet escalations
//!
//! Usage:
//!   escalation_desk search <address>
//!   escalation_desk freeze <address> <reason...>
//!   escalation_desk unfreeze <address> <reason...>
//!   escalation_desk frozen [query]
//!   escalation_desk unfrozen [query]
//!   escalation_desk watch <frozen|unfrozen>
//!   escalation_desk report <wallet> <station> <description...>
//!
//! Environment:
//!   ESCALATION_API_URL      - API base URL (default: http://localhost:3000/api/v1)
//!   ESCALATION_TIMEOUT_SECS - Request timeout (default: 10)
//!   ESCALATION_POLL_SECS    - Poll interval for `watch` (default: 30)
//!   ESCALATION_ACTOR        - Operator identity (default: admin@cybercrime.gov)
//!   RUST_LOG                - Log level (default: info)

use escalation_desk::utils::filter::filter_rows;
use escalation_desk::{
    load_case, Actor, DeskConfig, EscalationController, NoticeLevel, PollState, PollSubscription,
    Poller, ReportLog, ReportWizard, RiskBand, StationDirectory, Tab, Transition, WalletApi,
    WalletApiClient, WalletData,
};

use eyre::{bail, eyre, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "usage: escalation_desk <search|freeze|unfreeze|frozen|unfrozen|watch|report> [args...]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = DeskConfig::from_env()?;
    info!("🛰️ Investigation API: {}", config.api_base_url);
    info!("👤 Acting as {}", config.actor);

    let client = WalletApiClient::new(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        bail!(USAGE);
    };

    match command.as_str() {
        "search" => {
            let address = rest.first().ok_or_else(|| eyre!("search <address>"))?;
            let mut desk = EscalationController::new(client);
            desk.set_search_input(address.as_str());
            let found = desk.search().await;
            if let Some(data) = desk.wallet_data() {
                print_wallet(data);
            }
            print_notice(&desk);
            found?;
        }
        "freeze" | "unfreeze" => {
            let transition = if command == "freeze" {
                Transition::Freeze
            } else {
                Transition::Unfreeze
            };
            let (address, reason) = rest
                .split_first()
                .ok_or_else(|| eyre!("{} <address> <reason...>", command))?;
            run_transition(client, &config.actor, transition, address, &reason.join(" ")).await?;
        }
        "frozen" => {
            let rows = client.list_frozen_wallets().await?;
            let query = rest.join(" ");
            let shown = filter_rows(&rows, &query);
            println!("🔒 Frozen wallets ({} of {})", shown.len(), rows.len());
            for row in shown {
                println!(
                    "   {:<44} score {:>3}  by {:<24} {}",
                    row.address,
                    row.risk_score,
                    row.frozen_by.as_deref().unwrap_or("-"),
                    row.freeze_reason.as_deref().unwrap_or("")
                );
            }
        }
        "unfrozen" => {
            let rows = client.list_unfrozen_wallets().await?;
            let query = rest.join(" ");
            let shown = filter_rows(&rows, &query);
            println!("🔓 Unfrozen wallets ({} of {})", shown.len(), rows.len());
            for row in shown {
                println!(
                    "   {:<44} score {:>3}  by {:<24} {}",
                    row.address,
                    row.risk_score,
                    row.unfrozen_by.as_deref().unwrap_or("-"),
                    row.unfreeze_reason.as_deref().unwrap_or("")
                );
            }
        }
        "watch" => match rest.first().map(String::as_str) {
            Some("frozen") => {
                let api = client.clone();
                let sub = Poller::start("frozen wallets", config.poll_interval, None, move || {
                    let api = api.clone();
                    async move { api.list_frozen_wallets().await }
                });
                watch_until_ctrl_c(sub).await;
            }
            Some("unfrozen") => {
                let api = client.clone();
                let sub = Poller::start("unfrozen wallets", config.poll_interval, None, move || {
                    let api = api.clone();
                    async move { api.list_unfrozen_wallets().await }
                });
                watch_until_ctrl_c(sub).await;
            }
            _ => bail!("watch <frozen|unfrozen>"),
        },
        "report" => {
            if rest.len() < 3 {
                bail!("report <wallet> <station> <description...>");
            }
            run_report(&client, &config.actor, &rest[0], &rest[1], &rest[2..].join(" ")).await?;
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }

    Ok(())
}

async fn run_transition(
    client: WalletApiClient,
    actor: &Actor,
    transition: Transition,
    address: &str,
    reason: &str,
) -> Result<()> {
    let mut desk = EscalationController::new(client);
    let tab = match transition {
        Transition::Freeze => Tab::Frozen,
        Transition::Unfreeze => Tab::Unfrozen,
    };
    // Land on the matching list so the refresh after the transition shows the result
    if desk.select_tab(tab).await.is_err() {
        warn!("⚠️ Could not load the list before {}", transition.as_str());
    }

    desk.set_search_input(address);
    if let Err(e) = desk.search().await {
        print_notice(&desk);
        return Err(e.into());
    }

    let opened = match transition {
        Transition::Freeze => desk.open_freeze_modal(),
        Transition::Unfreeze => desk.open_unfreeze_modal(),
    };
    if let Err(e) = opened {
        print_notice(&desk);
        return Err(e.into());
    }

    desk.set_modal_reason(reason);
    let submitted = desk.submit_modal(actor).await;

    if let Some(data) = desk.wallet_data() {
        print_wallet(data);
    }
    print_notice(&desk);
    submitted?;
    Ok(())
}

async fn run_report(
    client: &WalletApiClient,
    actor: &Actor,
    wallet: &str,
    station: &str,
    description: &str,
) -> Result<()> {
    let directory = StationDirectory::default();
    let station = directory
        .by_name(station)
        .or_else(|| directory.search(station).into_iter().next())
        .cloned()
        .ok_or_else(|| eyre!("no police station matches '{}'", station))?;

    let mut wizard = ReportWizard::new();
    wizard.set_wallet_id(wallet)?;
    wizard.submit_wallet()?;

    match load_case(client, &mut wizard).await {
        Ok(case) => println!(
            "📁 Case {} - {} evidence item(s) sealed",
            case.case_id,
            case.evidence().len()
        ),
        Err(e) => println!("⚠️ Continuing without case data: {}", e.user_message()),
    }

    wizard.continue_to_station()?;
    wizard.select_station(station)?;
    wizard.set_description(description)?;
    let report = wizard.send(actor)?;

    let mut log = ReportLog::default();
    log.record(report);
    for report in log.recent() {
        println!("📨 Report {} sent to {}", report.reference, report.station.name);
        println!("   Wallet:   {}", report.wallet_id);
        println!("   Contact:  {} ({})", report.station.email, report.station.telephone);
        for item in &report.evidence {
            println!("   Evidence: {} {}", item.display_id(), item.title);
        }
    }
    Ok(())
}

async fn watch_until_ctrl_c<T: Send + Sync + 'static>(
    mut sub: PollSubscription<Vec<T>>,
) {
    loop {
        tokio::select! {
            state = sub.changed() => match state {
                Some(state) => print_poll(&state),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\n🛑 Stopping...");
                break;
            }
        }
    }
    sub.stop().await;
}

fn print_poll<T>(state: &PollState<Vec<T>>) {
    match (&state.data, &state.last_error) {
        (_, Some(err)) => println!("⚠️ tick {}: {}", state.ticks, err),
        (Some(rows), None) => println!("🔄 tick {}: {} wallet(s)", state.ticks, rows.len()),
        (None, None) => {}
    }
}

fn print_wallet(data: &WalletData) {
    let wallet = &data.wallet;
    let band = RiskBand::from_score(data.effective_risk_score());
    println!("{} {}", wallet.freeze_state().emoji(), wallet.address);
    println!("   State:     {}", wallet.freeze_state().as_str());
    println!("   Risk:      {} ({})", data.effective_risk_score(), band.label());
    println!("   Advice:    {}", band.recommendation());
    if !data.ml_tags.is_empty() {
        println!("   ML tags:   {}", data.ml_tags.join(", "));
    }
    println!(
        "   Evidence:  {}  Complaints: {}  Incidents: {}",
        data.evidence.len(),
        data.complaints_count,
        data.incident_reports_count
    );
    if wallet.is_frozen {
        println!(
            "   Frozen by: {} ({})",
            wallet.frozen_by.as_deref().unwrap_or("-"),
            wallet.freeze_reason.as_deref().unwrap_or("-")
        );
    } else if let Some(by) = &wallet.unfrozen_by {
        println!(
            "   Unfrozen by: {} ({})",
            by,
            wallet.unfreeze_reason.as_deref().unwrap_or("-")
        );
    }
}

fn print_notice<C: WalletApi>(desk: &EscalationController<C>) {
    if let Some(notice) = desk.notice() {
        let icon = match notice.level {
            NoticeLevel::Info => "✅",
            NoticeLevel::Warning => "⚠️",
            NoticeLevel::Error => "❌",
        };
        println!("{} {}", icon, notice.message);
    }
}
