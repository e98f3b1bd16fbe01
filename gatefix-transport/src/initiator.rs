/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! TCP socket initiator.
//!
//! [`SocketInitiator`] implements [`Transport`] on top of a dedicated thread
//! running a current-thread tokio runtime. Callers stay synchronous; the
//! connection loop talks to them through channels and the [`Application`]
//! callbacks.

use crate::connection::{self, Context, Outbound};
use gatefix_core::error::{Result, SessionError};
use gatefix_core::message::Message;
use gatefix_session::{Application, SessionConfig, SessionId, Transport};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// Handles of a running connection loop.
struct Running {
    outbound: mpsc::UnboundedSender<Outbound>,
    shutdown: watch::Sender<bool>,
    done: crossbeam_channel::Receiver<()>,
    thread: JoinHandle<()>,
}

/// Client-side TCP transport for one FIX session.
pub struct SocketInitiator {
    config: SessionConfig,
    active: Arc<Mutex<Option<SessionId>>>,
    running: Mutex<Option<Running>>,
    stopped: Arc<AtomicBool>,
}

impl SocketInitiator {
    /// Creates an initiator; nothing connects until [`Transport::start`].
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            active: Arc::new(Mutex::new(None)),
            running: Mutex::new(None),
            stopped: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the logged-on session, if any.
    #[must_use]
    pub fn active_session(&self) -> Option<SessionId> {
        self.active.lock().clone()
    }
}

impl std::fmt::Debug for SocketInitiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketInitiator")
            .field("address", &self.config.address())
            .field("active", &*self.active.lock())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl Transport for SocketInitiator {
    fn start(&self, application: Arc<dyn Application>) -> Result<()> {
        let mut running = self.running.lock();
        if let Some(current) = running.as_ref()
            && !current.thread.is_finished()
        {
            return Err(SessionError::AlreadyStarted {
                state: "running".to_string(),
            }
            .into());
        }
        if let Some(previous) = running.take()
            && previous.thread.join().is_err()
        {
            warn!("previous initiator thread panicked");
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let ctx = Context {
            config: self.config.clone(),
            app: application,
            active: Arc::clone(&self.active),
        };

        let stopped = Arc::clone(&self.stopped);
        stopped.store(false, Ordering::SeqCst);
        let spawned = std::thread::Builder::new()
            .name("gatefix-initiator".to_string())
            .spawn(move || {
                runtime.block_on(connection::run(ctx, outbound_rx, shutdown_rx));
                stopped.store(true, Ordering::SeqCst);
                let _ = done_tx.send(());
            });
        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                self.stopped.store(true, Ordering::SeqCst);
                return Err(e.into());
            }
        };

        *running = Some(Running {
            outbound: outbound_tx,
            shutdown: shutdown_tx,
            done: done_rx,
            thread,
        });
        info!("initiator started for {}", self.config.address());
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let Some(running) = self.running.lock().take() else {
            return Ok(());
        };
        let _ = running.shutdown.send(true);

        if std::thread::current().id() == running.thread.thread().id() {
            // Called from a callback; the loop winds down once it returns.
            return Ok(());
        }

        let wait = self.config.logout_timeout + Duration::from_secs(1);
        match running.done.recv_timeout(wait) {
            Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                if running.thread.join().is_err() {
                    warn!("initiator thread panicked");
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                warn!("initiator did not stop within {:?}", wait);
            }
        }
        *self.active.lock() = None;
        Ok(())
    }

    fn send(&self, message: Message, session_id: &SessionId) -> Result<()> {
        let active = self.active.lock();
        if active.as_ref() != Some(session_id) {
            return Err(SessionError::NotConnected.into());
        }
        let running = self.running.lock();
        let Some(running) = running.as_ref() else {
            return Err(SessionError::NotConnected.into());
        };
        running
            .outbound
            .send(Outbound {
                session_id: session_id.clone(),
                message,
            })
            .map_err(|_| SessionError::NotConnected.into())
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for SocketInitiator {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
