/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # GateFix Session
//!
//! FIX session layer building blocks for the GateFix client engine.
//!
//! This crate provides:
//! - **Configuration**: `SessionConfig`, its builder and the redacted `Credential`
//! - **Lifecycle**: the `SessionState` enum
//! - **Seams**: the `Application` callbacks and the `Transport` trait
//! - **Admin messages**: Logon, Heartbeat, TestRequest, Logout
//! - **Liveness and sequencing**: `HeartbeatMonitor`, `SequenceNumbers`

pub mod admin;
pub mod application;
pub mod config;
pub mod heartbeat;
pub mod sequence;
pub mod state;
pub mod transport;

pub use application::{Application, SessionId};
pub use config::{Credential, SessionConfig, SessionConfigBuilder};
pub use heartbeat::{HeartbeatAction, HeartbeatMonitor};
pub use sequence::{SequenceCheck, SequenceNumbers};
pub use state::SessionState;
pub use transport::Transport;
