/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Controller builder for fluent configuration.
//!
//! The builder takes the sender password out of the [`SessionConfig`] before
//! the config reaches the transport, so only the controller ever holds it.

use crate::controller::SessionController;
use crate::handler::EventHandler;
use crate::id::{ClOrdIdGenerator, Clock};
use gatefix_core::error::{Result, SessionError};
use gatefix_session::{Credential, SessionConfig, Transport};
use gatefix_transport::SocketInitiator;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How long [`SessionController::start`] waits for logon by default.
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for a [`SessionController`].
pub struct ControllerBuilder {
    config: Option<SessionConfig>,
    transport: Option<Arc<dyn Transport>>,
    credential: Option<Credential>,
    start_timeout: Duration,
    handlers: Vec<Arc<dyn EventHandler>>,
    clock: Option<Clock>,
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            transport: None,
            credential: None,
            start_timeout: DEFAULT_START_TIMEOUT,
            handlers: Vec::new(),
            clock: None,
        }
    }

    /// Sets the session configuration used for the default socket transport.
    ///
    /// A sender password in the config becomes the controller's credential.
    #[must_use]
    pub fn with_config(mut self, mut config: SessionConfig) -> Self {
        if let Some(password) = config.sender_password.take() {
            self.credential = Some(password);
        }
        self.config = Some(config);
        self
    }

    /// Uses a custom transport instead of a [`SocketInitiator`].
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the credential placed in Password (554) on every Logon.
    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Sets how long `start` waits for logon.
    #[must_use]
    pub const fn with_start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    /// Registers an event handler.
    #[must_use]
    pub fn with_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Replaces the nanosecond clock seeding client order ids.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Returns the session configuration, without its password.
    #[must_use]
    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    /// Returns true if a credential will be sent on logon.
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Returns the start timeout.
    #[must_use]
    pub const fn start_timeout(&self) -> Duration {
        self.start_timeout
    }

    /// Builds the controller.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` when neither a config nor a
    /// transport was given.
    pub fn build(self) -> Result<SessionController> {
        let transport: Arc<dyn Transport> = match (self.transport, self.config) {
            (Some(transport), _) => transport,
            (None, Some(config)) => Arc::new(SocketInitiator::new(config)),
            (None, None) => {
                return Err(SessionError::Configuration(
                    "a session config or a transport is required".to_string(),
                )
                .into());
            }
        };
        if self.credential.is_none() {
            debug!("no sender password configured, logon will carry none");
        }
        let ids = self
            .clock
            .map_or_else(ClOrdIdGenerator::new, ClOrdIdGenerator::with_clock);

        Ok(SessionController::new(
            transport,
            self.credential,
            self.handlers,
            ids,
            self.start_timeout,
        ))
    }
}

impl SessionController {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatefix_core::types::CompId;
    use gatefix_session::SessionState;

    fn config() -> SessionConfig {
        SessionConfig::new(
            "127.0.0.1",
            9878,
            CompId::new("CLIENT").unwrap(),
            CompId::new("GATEWAY").unwrap(),
        )
        .with_sender_password(Credential::new("hunter2"))
    }

    #[test]
    fn test_builder_defaults() {
        let builder = ControllerBuilder::new();
        assert_eq!(builder.start_timeout(), DEFAULT_START_TIMEOUT);
        assert!(builder.config().is_none());
        assert!(!builder.has_credential());
    }

    #[test]
    fn test_config_password_moves_to_controller() {
        let builder = SessionController::builder().with_config(config());
        assert!(builder.has_credential());
        assert!(builder.config().unwrap().sender_password.is_none());

        let controller = builder
            .with_start_timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        assert_eq!(controller.state(), SessionState::Disconnected);
        assert_eq!(controller.start_timeout(), Duration::from_secs(3));
        assert!(!format!("{:?}", controller).contains("hunter2"));
    }

    #[test]
    fn test_build_requires_config_or_transport() {
        let err = ControllerBuilder::new().build().unwrap_err();
        assert!(matches!(
            err.as_session(),
            Some(SessionError::Configuration(_))
        ));
    }

    #[test]
    fn test_custom_clock() {
        let controller = ControllerBuilder::new()
            .with_config(config())
            .with_clock(Box::new(|| 7))
            .build();
        assert!(controller.is_ok());
    }
}
