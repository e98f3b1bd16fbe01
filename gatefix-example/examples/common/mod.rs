/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Common utilities shared across samples.

#![allow(dead_code)]

use gatefix_core::SessionError;
use gatefix_session::SessionConfig;
use gatefix_session::config::{ENV_HOST, ENV_PORT, ENV_SENDER, ENV_TARGET};
use std::env;

/// Default gateway port.
pub const DEFAULT_PORT: u16 = 9878;

/// Default gateway host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Loads the client configuration from `FIX_*` variables, falling back to
/// the local gateway simulator for anything unset.
pub fn client_config() -> Result<SessionConfig, SessionError> {
    SessionConfig::from_lookup(|key| {
        env::var(key).ok().or_else(|| {
            let fallback = match key {
                ENV_HOST => DEFAULT_HOST.to_string(),
                ENV_PORT => DEFAULT_PORT.to_string(),
                ENV_SENDER => "CLIENT".to_string(),
                ENV_TARGET => "GATEWAY".to_string(),
                _ => return None,
            };
            Some(fallback)
        })
    })
}

/// Returns the address the gateway simulator listens on.
pub fn gateway_addr() -> String {
    let host = env::var(ENV_HOST).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var(ENV_PORT)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    format!("{}:{}", host, port)
}

/// Initializes logging for samples.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}
