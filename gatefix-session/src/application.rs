/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Application callback interface.
//!
//! The transport drives the session and reports everything through the
//! [`Application`] trait, following the QuickFIX callback pattern. Callbacks
//! run on the transport's own thread and must return quickly.

use gatefix_core::error::SessionError;
use gatefix_core::message::Message;
use std::fmt;

/// Identifies one logical session.
///
/// The connection number grows on every (re)connection, so a re-logon
/// yields an identifier that differs from the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    /// BeginString (FIX version).
    pub begin_string: String,
    /// Sender CompID.
    pub sender_comp_id: String,
    /// Target CompID.
    pub target_comp_id: String,
    /// Connection number within the lifetime of the transport.
    pub connection: u64,
}

impl SessionId {
    /// Creates a new session ID for connection zero.
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            connection: 0,
        }
    }

    /// Sets the connection number.
    #[must_use]
    pub const fn with_connection(mut self, connection: u64) -> Self {
        self.connection = connection;
        self
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}->{}#{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id, self.connection
        )
    }
}

/// Callbacks invoked by a [`Transport`](crate::Transport).
#[allow(clippy::wrong_self_convention)]
pub trait Application: Send + Sync {
    /// Called when a connection is established, before Logon is sent.
    fn on_create(&self, _session_id: &SessionId) {}

    /// Called when the counterparty acknowledges Logon.
    fn on_logon(&self, session_id: &SessionId);

    /// Called when a logged-on session ends, or a Logon is refused.
    fn on_logout(&self, session_id: &SessionId);

    /// Called before an admin message (Logon, Heartbeat, ...) is sent.
    ///
    /// The message may be modified, e.g. to add credentials to Logon.
    fn to_admin(&self, _message: &mut Message, _session_id: &SessionId) {}

    /// Called when an admin message is received.
    fn from_admin(&self, _message: &Message, _session_id: &SessionId) {}

    /// Called before an application message is sent.
    fn to_app(&self, _message: &mut Message, _session_id: &SessionId) {}

    /// Called when an application message is received.
    fn from_app(&self, message: &Message, session_id: &SessionId);

    /// Called once the transport has given up on the session.
    fn on_error(&self, _error: &SessionError) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new("FIX.4.4", "CLIENT", "GATEWAY").with_connection(3);
        assert_eq!(id.to_string(), "FIX.4.4:CLIENT->GATEWAY#3");
    }

    #[test]
    fn test_session_id_differs_per_connection() {
        let first = SessionId::new("FIX.4.4", "CLIENT", "GATEWAY").with_connection(1);
        let second = first.clone().with_connection(2);
        assert_ne!(first, second);
    }
}
