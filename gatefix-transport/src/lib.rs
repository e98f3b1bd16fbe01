/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # GateFix Transport
//!
//! Network transport layer for the GateFix client engine.
//!
//! This crate provides:
//! - **Codec**: Tokio codec for FIX message framing
//! - **Initiator**: `SocketInitiator`, a TCP client implementing the
//!   session `Transport` trait with logon, heartbeats and reconnects

mod connection;
pub mod codec;
pub mod initiator;

pub use codec::FixCodec;
pub use initiator::SocketInitiator;
