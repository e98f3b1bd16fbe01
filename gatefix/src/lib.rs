/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # GateFix
//!
//! A client-side FIX 4.4 session engine for Rust.
//!
//! GateFix logs on to a FIX gateway, submits orders and market data
//! subscriptions, and turns inbound execution reports, snapshots and news
//! into typed domain events.
//!
//! ## Features
//!
//! - **Blocking facade**: `start`, `submit` and `stop` from plain threads
//! - **Validated requests**: orders and subscriptions are checked before sending
//! - **Typed events**: unknown codes are preserved instead of dropped
//! - **Async transport**: a Tokio socket initiator with heartbeats and reconnects
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gatefix::prelude::*;
//!
//! let controller = SessionController::builder()
//!     .with_config(SessionConfig::from_env()?)
//!     .with_handler(|event: &DomainEvent, _: &SessionId| println!("{}", event))
//!     .build()?;
//! controller.start()?;
//! let id = controller.submit(OrderRequest::buy("BTCUSD", qty, Some(price)))?;
//! controller.stop()?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Messages, wire enumerations and error definitions
//! - [`tagvalue`]: Tag=value encoding and decoding
//! - [`session`]: Configuration, callbacks and session bookkeeping
//! - [`transport`]: Framing codec and socket initiator
//! - [`engine`]: Requests, events and the session controller

pub mod core {
    //! Messages, wire enumerations and error definitions.
    pub use gatefix_core::*;
}

pub mod tagvalue {
    //! Tag=value encoding and decoding.
    pub use gatefix_tagvalue::*;
}

pub mod session {
    //! Configuration, callbacks and session bookkeeping.
    pub use gatefix_session::*;
}

pub mod transport {
    //! Framing codec and socket initiator.
    pub use gatefix_transport::*;
}

pub mod engine {
    //! Requests, events and the session controller.
    pub use gatefix_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use gatefix_core::{
        CompId, ExecType, FieldMap, FixError, Message, MsgType, OrdStatus, OrdType, Result,
        SessionError, Side, TimeInForce, Timestamp, ValidationError, WireEnum, tags,
    };

    // Session
    pub use gatefix_session::{
        Application, Credential, SessionConfig, SessionConfigBuilder, SessionId, SessionState,
        Transport,
    };

    // Transport
    pub use gatefix_transport::SocketInitiator;

    // Engine
    pub use gatefix_engine::{
        ChannelHandler, ControllerBuilder, DomainEvent, EventHandler, MarketDataRequest,
        OrderRequest, Request, SessionController, SessionEvent,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_prelude_imports() {
        let order = OrderRequest::buy("BTCUSD", Decimal::ONE, None).with_cl_ord_id("1");
        let message = order.build().unwrap();
        assert_eq!(message.msg_type(), Some(MsgType::NewOrderSingle));
        assert_eq!(message.get(tags::SIDE), Some("1"));
        assert_eq!(SessionState::default(), SessionState::Disconnected);
    }

    #[test]
    fn test_encode_through_facade() {
        let message = MarketDataRequest::for_symbols(["EURUSD"])
            .with_md_req_id("1")
            .build()
            .unwrap();
        let encoded = crate::tagvalue::Encoder::encode(&message).unwrap();
        let decoded = crate::tagvalue::Decoder::new(&encoded).decode().unwrap();
        assert_eq!(decoded.group(tags::NO_RELATED_SYM).len(), 1);
    }
}
