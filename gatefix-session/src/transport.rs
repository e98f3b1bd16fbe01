/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Transport abstraction consumed by the session controller.

use crate::application::{Application, SessionId};
use gatefix_core::error::Result;
use gatefix_core::message::Message;
use std::sync::Arc;

/// Carries one session to the counterparty.
///
/// Implementations own connection handling, Logon/Logout exchange,
/// heartbeats and sequence numbers, and report back through the
/// [`Application`] given to [`Transport::start`].
pub trait Transport: Send + Sync {
    /// Starts connecting. Returns once the attempt is under way.
    ///
    /// # Errors
    /// Returns an error if the transport cannot be started.
    fn start(&self, application: Arc<dyn Application>) -> Result<()>;

    /// Logs out and stops. Safe to call more than once.
    ///
    /// # Errors
    /// Returns an error if shutting down fails.
    fn stop(&self) -> Result<()>;

    /// Sends an application message on the given session.
    ///
    /// # Errors
    /// Returns `SessionError::NotConnected` unless `session_id` is the
    /// active logged-on session.
    fn send(&self, message: Message, session_id: &SessionId) -> Result<()>;

    /// Returns true once the transport has stopped.
    fn is_stopped(&self) -> bool;
}
