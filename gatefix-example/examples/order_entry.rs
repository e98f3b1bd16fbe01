/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Order entry sample.
//!
//! Logs on, submits a limit buy and a market sell, prints the execution
//! reports for a few seconds and logs out. Start `gateway_sim` first to run
//! it locally.

use anyhow::Result;
use gatefix_core::{Side, TimeInForce};
use gatefix_engine::{ChannelHandler, OrderRequest, SessionController, SessionEvent};
use rust_decimal::Decimal;
use std::time::{Duration, Instant};
use tracing::{info, warn};

mod common;
use common::{client_config, init_logging};

fn main() -> Result<()> {
    init_logging();
    let config = client_config()?;
    info!("connecting to {}", config.address());

    let (handler, events) = ChannelHandler::unbounded();
    let controller = SessionController::builder()
        .with_config(config)
        .with_handler(handler)
        .with_start_timeout(Duration::from_secs(15))
        .build()?;

    let session_id = controller.start()?;
    info!("logged on as {}", session_id);

    let buy = OrderRequest::buy("BTCUSD", Decimal::new(10, 1), Some(Decimal::new(400_000, 1)))
        .with_destination("SIM");
    let id = controller.submit(buy)?;
    info!("limit buy submitted as {}", id);

    let sell = OrderRequest::sell("ETHUSD", Decimal::new(25, 1), None)
        .with_time_in_force(TimeInForce::ImmediateOrCancel);
    let id = controller.submit(sell)?;
    info!("market sell submitted as {}", id);

    if let Err(err) = controller.submit(OrderRequest::market(Side::Buy, "BTCUSD", Decimal::ZERO)) {
        warn!("zero quantity order not sent: {}", err);
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    while let Ok(SessionEvent { session_id, event }) = events.recv_deadline(deadline) {
        info!("{}: {}", session_id, event);
    }

    controller.stop()?;
    info!("session state {}", controller.state());
    Ok(())
}
