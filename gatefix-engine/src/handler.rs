/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Event handlers.
//!
//! Handlers run on the transport thread. Anything slow belongs on the other
//! side of a [`ChannelHandler`].

use crate::event::DomainEvent;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use gatefix_session::SessionId;
use tracing::{debug, warn};

/// Receives every classified inbound event.
pub trait EventHandler: Send + Sync {
    /// Called once per inbound application message.
    fn on_event(&self, event: &DomainEvent, session_id: &SessionId);
}

impl<F> EventHandler for F
where
    F: Fn(&DomainEvent, &SessionId) + Send + Sync,
{
    fn on_event(&self, event: &DomainEvent, session_id: &SessionId) {
        self(event, session_id);
    }
}

/// An event together with the session it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    /// Session the event arrived on.
    pub session_id: SessionId,
    /// The event.
    pub event: DomainEvent,
}

/// Forwards events to a crossbeam channel.
///
/// A full bounded channel drops the event with a warning instead of
/// blocking the transport.
#[derive(Debug, Clone)]
pub struct ChannelHandler {
    tx: Sender<SessionEvent>,
}

impl ChannelHandler {
    /// Wraps an existing sender.
    #[must_use]
    pub const fn new(tx: Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Creates a handler over a new unbounded channel.
    #[must_use]
    pub fn unbounded() -> (Self, Receiver<SessionEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }

    /// Creates a handler over a new channel holding at most `capacity` events.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, Receiver<SessionEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self::new(tx), rx)
    }
}

impl EventHandler for ChannelHandler {
    fn on_event(&self, event: &DomainEvent, session_id: &SessionId) {
        let item = SessionEvent {
            session_id: session_id.clone(),
            event: event.clone(),
        };
        match self.tx.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(item)) => {
                warn!("{}: event channel full, dropping {}", session_id, item.event.kind());
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("{}: event receiver gone", session_id);
            }
        }
    }
}
