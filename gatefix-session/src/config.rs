/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Session configuration.
//!
//! [`SessionConfig`] carries everything the initiator needs to open and keep
//! one session alive. It can be assembled with [`SessionConfigBuilder`] or
//! read from `FIX_*` environment variables.

use gatefix_core::error::SessionError;
use gatefix_core::types::{BEGIN_STRING_FIX44, CompId};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Environment variable holding the gateway host.
pub const ENV_HOST: &str = "FIX_HOST";
/// Environment variable holding the gateway port.
pub const ENV_PORT: &str = "FIX_PORT";
/// Environment variable holding the SenderCompID.
pub const ENV_SENDER: &str = "FIX_SENDER";
/// Environment variable holding the TargetCompID.
pub const ENV_TARGET: &str = "FIX_TARGET";
/// Environment variable overriding the BeginString.
pub const ENV_BEGIN_STRING: &str = "FIX_BEGIN_STRING";
/// Environment variable overriding the heartbeat interval, in seconds.
pub const ENV_HEARTBEAT_SECS: &str = "FIX_HEARTBEAT_SECS";
/// Environment variable holding the sender password.
pub const ENV_SENDER_PASSWORD: &str = "FIX_SENDER_PASSWORD";

/// Secret sent in the Logon Password field.
///
/// Debug and Display never reveal the value; use [`Credential::expose`] at
/// the single point where it is written into a message.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Configuration for a FIX client session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Gateway host name or address.
    pub host: String,
    /// Gateway TCP port.
    pub port: u16,
    /// Sender CompID (tag 49).
    pub sender_comp_id: CompId,
    /// Target CompID (tag 56).
    pub target_comp_id: CompId,
    /// FIX version BeginString (e.g., "FIX.4.4").
    pub begin_string: String,
    /// Heartbeat interval announced in Logon (tag 108).
    pub heartbeat_interval: Duration,
    /// Whether Logon carries ResetSeqNumFlag=Y.
    pub reset_on_logon: bool,
    /// How long to wait for the Logon acknowledgement.
    pub logon_timeout: Duration,
    /// How long to wait for the Logout acknowledgement.
    pub logout_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Delay between reconnection attempts.
    pub reconnect_interval: Duration,
    /// Consecutive failed attempts before giving up (0 = unlimited).
    pub max_reconnect_attempts: u32,
    /// Maximum inbound message size in bytes.
    pub max_message_size: usize,
    /// Whether to validate inbound checksums.
    pub validate_checksum: bool,
    /// Password sent in Logon (tag 554).
    pub sender_password: Option<Credential>,
}

impl SessionConfig {
    /// Creates a configuration with default timings.
    ///
    /// # Arguments
    /// * `host` - Gateway host
    /// * `port` - Gateway port
    /// * `sender_comp_id` - The sender CompID
    /// * `target_comp_id` - The target CompID
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        sender_comp_id: CompId,
        target_comp_id: CompId,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            sender_comp_id,
            target_comp_id,
            begin_string: BEGIN_STRING_FIX44.to_string(),
            heartbeat_interval: Duration::from_secs(30),
            reset_on_logon: true,
            logon_timeout: Duration::from_secs(10),
            logout_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            reconnect_interval: Duration::from_secs(5),
            max_reconnect_attempts: 0,
            max_message_size: 1024 * 1024,
            validate_checksum: true,
            sender_password: None,
        }
    }

    /// Reads the configuration from `FIX_*` environment variables.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` when a required variable is
    /// missing or a value does not parse.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// `FIX_HOST`, `FIX_PORT`, `FIX_SENDER` and `FIX_TARGET` are required. A
    /// missing `FIX_SENDER_PASSWORD` is only a warning since some gateways
    /// accept password-less logons.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` when a required key is missing
    /// or a value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| SessionError::Configuration(format!("{} is not set", key)))
        };

        let port = required(ENV_PORT)?;
        let port = port
            .parse::<u16>()
            .map_err(|_| SessionError::Configuration(format!("{} is not a port: {}", ENV_PORT, port)))?;

        let mut builder = SessionConfigBuilder::new()
            .host(required(ENV_HOST)?)
            .port(port)
            .sender_comp_id(required(ENV_SENDER)?)
            .target_comp_id(required(ENV_TARGET)?);

        if let Some(begin_string) = lookup(ENV_BEGIN_STRING) {
            builder = builder.begin_string(begin_string);
        }
        if let Some(secs) = lookup(ENV_HEARTBEAT_SECS) {
            let secs = secs.parse::<u64>().map_err(|_| {
                SessionError::Configuration(format!("{} is not a number: {}", ENV_HEARTBEAT_SECS, secs))
            })?;
            builder = builder.heartbeat_interval(Duration::from_secs(secs));
        }
        match lookup(ENV_SENDER_PASSWORD).filter(|value| !value.is_empty()) {
            Some(password) => builder = builder.sender_password(Credential::new(password)),
            None => warn!("{} is not set, logon will carry no password", ENV_SENDER_PASSWORD),
        }

        builder.build()
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets the logon timeout.
    #[must_use]
    pub fn with_logon_timeout(mut self, timeout: Duration) -> Self {
        self.logon_timeout = timeout;
        self
    }

    /// Sets the delay between reconnection attempts.
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the number of consecutive failed attempts tolerated.
    #[must_use]
    pub const fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Sets the sender password.
    #[must_use]
    pub fn with_sender_password(mut self, password: Credential) -> Self {
        self.sender_password = Some(password);
        self
    }

    /// Returns the heartbeat interval in whole seconds.
    #[must_use]
    pub fn heartbeat_interval_secs(&self) -> u64 {
        self.heartbeat_interval.as_secs()
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for session configuration.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    sender_comp_id: Option<String>,
    target_comp_id: Option<String>,
    begin_string: Option<String>,
    heartbeat_interval: Option<Duration>,
    reset_on_logon: Option<bool>,
    logon_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    reconnect_interval: Option<Duration>,
    max_reconnect_attempts: Option<u32>,
    sender_password: Option<Credential>,
}

impl SessionConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gateway host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the gateway port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the sender CompID.
    #[must_use]
    pub fn sender_comp_id(mut self, id: impl Into<String>) -> Self {
        self.sender_comp_id = Some(id.into());
        self
    }

    /// Sets the target CompID.
    #[must_use]
    pub fn target_comp_id(mut self, id: impl Into<String>) -> Self {
        self.target_comp_id = Some(id.into());
        self
    }

    /// Sets the FIX version.
    #[must_use]
    pub fn begin_string(mut self, version: impl Into<String>) -> Self {
        self.begin_string = Some(version.into());
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Sets whether to reset sequence numbers on logon.
    #[must_use]
    pub const fn reset_on_logon(mut self, reset: bool) -> Self {
        self.reset_on_logon = Some(reset);
        self
    }

    /// Sets the logon timeout.
    #[must_use]
    pub const fn logon_timeout(mut self, timeout: Duration) -> Self {
        self.logon_timeout = Some(timeout);
        self
    }

    /// Sets the TCP connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the delay between reconnection attempts.
    #[must_use]
    pub const fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = Some(interval);
        self
    }

    /// Sets the number of consecutive failed attempts tolerated (0 = unlimited).
    #[must_use]
    pub const fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = Some(attempts);
        self
    }

    /// Sets the sender password.
    #[must_use]
    pub fn sender_password(mut self, password: Credential) -> Self {
        self.sender_password = Some(password);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if host, port or a CompID is
    /// missing or invalid, or if the heartbeat interval is zero.
    pub fn build(self) -> Result<SessionConfig, SessionError> {
        let host = self
            .host
            .filter(|h| !h.is_empty())
            .ok_or_else(|| SessionError::Configuration("host is required".to_string()))?;
        let port = self
            .port
            .ok_or_else(|| SessionError::Configuration("port is required".to_string()))?;
        let sender = comp_id("sender_comp_id", self.sender_comp_id)?;
        let target = comp_id("target_comp_id", self.target_comp_id)?;

        let mut config = SessionConfig::new(host, port, sender, target);
        if let Some(begin_string) = self.begin_string {
            config.begin_string = begin_string;
        }
        if let Some(interval) = self.heartbeat_interval {
            if interval.is_zero() {
                return Err(SessionError::Configuration(
                    "heartbeat interval must be positive".to_string(),
                ));
            }
            config.heartbeat_interval = interval;
        }
        if let Some(reset) = self.reset_on_logon {
            config.reset_on_logon = reset;
        }
        if let Some(timeout) = self.logon_timeout {
            config.logon_timeout = timeout;
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout = timeout;
        }
        if let Some(interval) = self.reconnect_interval {
            config.reconnect_interval = interval;
        }
        if let Some(attempts) = self.max_reconnect_attempts {
            config.max_reconnect_attempts = attempts;
        }
        config.sender_password = self.sender_password;

        Ok(config)
    }
}

fn comp_id(name: &str, value: Option<String>) -> Result<CompId, SessionError> {
    let value = value.ok_or_else(|| SessionError::Configuration(format!("{} is required", name)))?;
    CompId::new(&value).ok_or_else(|| {
        SessionError::Configuration(format!("{} must be 1 to 32 characters: {}", name, value))
    })
}
