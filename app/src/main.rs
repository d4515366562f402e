//! `quatro [quatro.key=value ...]`
//!
//! Registers (or replays) a ticket against the backend and runs the reel
//! draw in the terminal. Ctrl-C cancels the draw.

mod entry;
mod terminal;

use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use quatro_abi::{PlayRequest, ResultBundle};
use quatro_lib::{AppConfig, log_init};
use quatro_provider::HttpClient;
use quatro_reels::{ReelSequencer, SequencerSettings, StartStatus};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::entry::{Entry, Ticket};
use crate::terminal::{TerminalBackend, print_lines};

const FLUSH_GRACE: Duration = Duration::from_secs(1);

async fn register(client: &HttpClient, entry: &Entry) -> Result<PlayRequest> {
    let (ticket_id, ticket_number) = match &entry.ticket {
        Ticket::Registered { id, .. } => (*id, id.to_string()),
        Ticket::New(ticket) => {
            if client.ticket_exists(&ticket.external_ticket_number).await? {
                bail!(
                    "ticket {} is already registered",
                    ticket.external_ticket_number
                );
            }
            let record = client
                .create_ticket(ticket)
                .await
                .wrap_err("could not register the ticket")?;
            info!("ticket {} registered as {}", ticket.external_ticket_number, record.id);
            (record.id, ticket.external_ticket_number.clone())
        }
    };
    Ok(PlayRequest {
        ticket_id,
        ticket_number,
        agent_id: entry.agent_id.clone(),
        chosen: entry.numbers(),
    })
}

async fn claim_prize(client: &HttpClient, bundle: &ResultBundle, phone: Option<&str>) {
    let Some(phone) = phone.filter(|_| bundle.has_won) else {
        return;
    };
    match client.update_ticket_phone(bundle.ticket_id, phone).await {
        Ok(_) => println!("  prize reserved for {}", phone),
        Err(err) => warn!("could not attach phone number to ticket {}: {}", bundle.ticket_id, err),
    }
}

/// Waits for queued terminal lines; the printer stops once the sequencer
/// and its draw task have let go of the backend.
async fn flush(printer: JoinHandle<()>) {
    if timeout(FLUSH_GRACE, printer).await.is_err() {
        warn!("terminal output did not drain in time");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cmdline = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let cfg = AppConfig::load(Some(&cmdline))?;
    log_init(cfg.log_level);
    let entry = Entry::from_cmdline(&cmdline, &mut rand::thread_rng())?;

    let client = HttpClient::from_config(&cfg)?;
    let gifts = client.gifts_or_fallback().await;
    let in_stock: Vec<_> = gifts.iter().filter(|g| g.in_stock()).map(|g| g.name.as_str()).collect();
    if !in_stock.is_empty() {
        println!("Prizes in play: {}", in_stock.join(", "));
    }

    let request = register(&client, &entry).await?;
    let (backend, lines) = TerminalBackend::new();
    let printer = tokio::spawn(print_lines(lines));
    let sequencer = ReelSequencer::new(client, backend, SequencerSettings::from_config(&cfg));
    if sequencer.start(request) != StartStatus::Started {
        bail!("a draw is already running");
    }

    let mut handoff = sequencer.subscribe_handoff();
    let bundle = tokio::select! {
        ready = handoff.wait_for(|bundle| bundle.is_some()) => {
            ready?.clone().ok_or_else(|| eyre!("draw ended without a result"))?
        }
        signal = tokio::signal::ctrl_c() => {
            signal.wrap_err("could not listen for Ctrl-C")?;
            sequencer.cancel();
            drop(sequencer);
            flush(printer).await;
            println!("Draw cancelled");
            return Ok(());
        }
    };

    claim_prize(sequencer.provider(), &bundle, entry.phone.as_deref()).await;
    drop(sequencer);
    flush(printer).await;
    Ok(())
}
