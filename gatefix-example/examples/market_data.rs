/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Market data subscription sample.
//!
//! Subscribes to the symbols in `FIX_SYMBOLS` (comma separated, default
//! `EURUSD,GBPUSD`) and prints each book snapshot for ten seconds.

use anyhow::Result;
use gatefix_core::{MdEntryType, WireEnum, tags};
use gatefix_engine::{DomainEvent, MarketDataRequest, SessionController};
use gatefix_session::SessionId;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

mod common;
use common::{client_config, init_logging};

fn on_event(event: &DomainEvent, session_id: &SessionId) {
    match event {
        DomainEvent::MarketDataSnapshot(snapshot) => {
            info!("{}: {}", session_id, event);
            for entry in &snapshot.entries {
                let side = entry
                    .get(tags::MD_ENTRY_TYPE)
                    .map(WireEnum::<MdEntryType>::from_wire);
                info!(
                    "  {:<6} {:>12} x {}",
                    side.as_ref().map_or("?", WireEnum::name),
                    entry.get(tags::MD_ENTRY_PX).unwrap_or("-"),
                    entry.get(tags::MD_ENTRY_SIZE).unwrap_or("-"),
                );
            }
        }
        DomainEvent::MarketDataReject(_) => warn!("{}: {}", session_id, event),
        other => info!("{}: {}", session_id, other),
    }
}

fn main() -> Result<()> {
    init_logging();
    let symbols = std::env::var("FIX_SYMBOLS").unwrap_or_else(|_| "EURUSD,GBPUSD".to_string());

    let controller = SessionController::builder()
        .with_config(client_config()?)
        .with_handler(on_event)
        .build()?;
    controller.start()?;

    let request = MarketDataRequest::for_symbols(symbols.split(',').map(str::trim));
    let id = controller.submit(request)?;
    info!("subscribed as {}", id);

    thread::sleep(Duration::from_secs(10));
    controller.stop()?;
    Ok(())
}
