/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # GateFix Engine
//!
//! Client-facing layer of the GateFix FIX engine.
//!
//! This crate provides:
//! - **Requests**: `OrderRequest` and `MarketDataRequest` builders with validation
//! - **Events**: the `DomainEvent` classifier for inbound application messages
//! - **Handlers**: the `EventHandler` trait and a channel-backed handler
//! - **Controller**: `SessionController`, a blocking start/submit/stop facade
//! - **Builder API**: `ControllerBuilder` for wiring config, transport and handlers

pub mod builder;
pub mod controller;
pub mod event;
pub mod handler;
pub mod id;
pub mod market_data;
pub mod order;
pub mod request;

pub use builder::ControllerBuilder;
pub use controller::{Activity, SessionController};
pub use event::{
    DomainEvent, ExecutionReport, MarketDataReject, MarketDataSnapshot, News, classify,
};
pub use handler::{ChannelHandler, EventHandler, SessionEvent};
pub use id::ClOrdIdGenerator;
pub use market_data::MarketDataRequest;
pub use order::OrderRequest;
pub use request::Request;
