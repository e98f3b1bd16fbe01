/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Client session controller.
//!
//! [`SessionController`] owns the session lifecycle on behalf of the caller:
//! it starts and stops the [`Transport`], waits for the Logon acknowledgement,
//! stamps client ids on outbound requests and turns inbound application
//! messages into [`DomainEvent`](crate::event::DomainEvent)s for the registered handlers.
//!
//! ```text
//! Disconnected -> Connecting -> LoggedIn -> LoggingOut -> Disconnected
//! ```
//!
//! State, session id and the id generator sit behind one mutex paired with a
//! condvar. The lock is never held across a transport call.

use crate::event::classify;
use crate::handler::EventHandler;
use crate::id::ClOrdIdGenerator;
use crate::request::Request;
use gatefix_core::error::{Result, SessionError};
use gatefix_core::message::{Message, MsgType};
use gatefix_core::tags;
use gatefix_core::types::Timestamp;
use gatefix_session::{Application, Credential, SessionId, SessionState, Transport};
use parking_lot::{Condvar, Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Last traffic seen in each direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activity {
    /// When the last message was handed to the wire.
    pub last_sent: Option<Timestamp>,
    /// When the last message arrived.
    pub last_received: Option<Timestamp>,
}

struct Inner {
    state: SessionState,
    session_id: Option<SessionId>,
    last_failure: Option<String>,
    starting: bool,
    ids: ClOrdIdGenerator,
    activity: Activity,
}

/// State shared with the transport through the [`Application`] callbacks.
struct Shared {
    inner: Mutex<Inner>,
    changed: Condvar,
    credential: Option<Credential>,
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl Shared {
    fn update<F: FnOnce(&mut Inner)>(&self, f: F) {
        f(&mut *self.inner.lock());
        self.changed.notify_all();
    }

    fn fail(&self, reason: String) {
        self.update(|inner| {
            inner.state = SessionState::Disconnected;
            inner.session_id = None;
            inner.starting = false;
            inner.last_failure = Some(reason);
        });
    }

    fn touch_sent(&self) {
        self.inner.lock().activity.last_sent = Some(Timestamp::now());
    }

    fn touch_received(&self) {
        self.inner.lock().activity.last_received = Some(Timestamp::now());
    }
}

impl Application for Shared {
    fn on_create(&self, session_id: &SessionId) {
        debug!("{}: connection created", session_id);
    }

    fn on_logon(&self, session_id: &SessionId) {
        self.update(|inner| match inner.state {
            SessionState::Connecting => {
                info!("{}: logged in", session_id);
                inner.state = SessionState::LoggedIn;
                inner.session_id = Some(session_id.clone());
                inner.last_failure = None;
            }
            state => warn!("{}: logon acknowledged while {}, ignored", session_id, state),
        });
    }

    fn on_logout(&self, session_id: &SessionId) {
        self.update(|inner| match inner.state {
            SessionState::LoggingOut => {
                info!("{}: logged out", session_id);
                inner.state = SessionState::Disconnected;
                inner.session_id = None;
            }
            SessionState::LoggedIn => {
                warn!("{}: forced logout, awaiting re-logon", session_id);
                inner.state = SessionState::Connecting;
                inner.session_id = None;
            }
            SessionState::Connecting if inner.starting => {
                warn!("{}: logon rejected", session_id);
                inner.state = SessionState::Disconnected;
                inner.last_failure = Some("logon rejected".to_string());
            }
            state => debug!("{}: logout while {}", session_id, state),
        });
    }

    fn to_admin(&self, message: &mut Message, session_id: &SessionId) {
        if message.msg_type() == Some(MsgType::Logon) {
            match &self.credential {
                Some(credential) => {
                    message.set(tags::PASSWORD, credential.expose());
                    debug!("{}: credential attached to logon", session_id);
                }
                None => debug!("{}: logon sent without credential", session_id),
            }
        }
        self.touch_sent();
    }

    fn from_admin(&self, _message: &Message, _session_id: &SessionId) {
        self.touch_received();
    }

    fn to_app(&self, _message: &mut Message, _session_id: &SessionId) {
        self.touch_sent();
    }

    fn from_app(&self, message: &Message, session_id: &SessionId) {
        self.touch_received();
        let event = classify(message);
        debug!("{}: {}", session_id, event);

        let handlers = self.handlers.read().clone();
        for handler in &handlers {
            handler.on_event(&event, session_id);
        }
    }

    fn on_error(&self, err: &SessionError) {
        error!("session abandoned: {}", err);
        self.fail(err.to_string());
    }
}

/// Synchronous facade over one client FIX session.
pub struct SessionController {
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
    start_timeout: Duration,
}

impl SessionController {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        credential: Option<Credential>,
        handlers: Vec<Arc<dyn EventHandler>>,
        ids: ClOrdIdGenerator,
        start_timeout: Duration,
    ) -> Self {
        let inner = Inner {
            state: SessionState::Disconnected,
            session_id: None,
            last_failure: None,
            starting: false,
            ids,
            activity: Activity::default(),
        };
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                changed: Condvar::new(),
                credential,
                handlers: RwLock::new(handlers),
            }),
            transport,
            start_timeout,
        }
    }

    /// Starts the session and waits for logon using the configured timeout.
    ///
    /// # Errors
    /// See [`start_within`](Self::start_within).
    pub fn start(&self) -> Result<SessionId> {
        self.start_within(self.start_timeout)
    }

    /// Starts the session and waits up to `timeout` for logon.
    ///
    /// # Returns
    /// The identifier of the logged-on session.
    ///
    /// # Errors
    /// - `SessionError::AlreadyStarted` unless the session is disconnected.
    /// - `SessionError::LoginFailed` if the logon is rejected, the transport
    ///   gives up, or `timeout` elapses. The transport is stopped.
    /// - Any error from starting the transport, unchanged.
    pub fn start_within(&self, timeout: Duration) -> Result<SessionId> {
        {
            let mut inner = self.shared.inner.lock();
            if inner.state != SessionState::Disconnected {
                return Err(SessionError::AlreadyStarted {
                    state: inner.state.to_string(),
                }
                .into());
            }
            inner.state = SessionState::Connecting;
            inner.session_id = None;
            inner.last_failure = None;
            inner.starting = true;
        }
        info!("starting session, waiting up to {:?} for logon", timeout);

        let application: Arc<dyn Application> = self.shared.clone();
        if let Err(err) = self.transport.start(application) {
            self.shared.fail(err.to_string());
            return Err(err);
        }

        match self.await_logon(timeout) {
            Ok(session_id) => Ok(session_id),
            Err(reason) => {
                warn!("login failed: {}", reason);
                if let Err(err) = self.transport.stop() {
                    warn!("stopping transport after failed login: {}", err);
                }
                Err(SessionError::LoginFailed { reason }.into())
            }
        }
    }

    fn await_logon(&self, timeout: Duration) -> std::result::Result<SessionId, String> {
        let deadline = Instant::now().checked_add(timeout);
        let mut inner = self.shared.inner.lock();
        let mut timed_out = false;
        let outcome = loop {
            match (inner.state, &inner.session_id) {
                (SessionState::LoggedIn, Some(session_id)) => break Ok(session_id.clone()),
                (SessionState::Disconnected, _) => {
                    break Err(inner
                        .last_failure
                        .clone()
                        .unwrap_or_else(|| "stopped before logon".to_string()));
                }
                _ if timed_out => {
                    break Err(format!("no logon acknowledgement within {:?}", timeout));
                }
                _ => {}
            }
            timed_out = match deadline {
                Some(deadline) => self.shared.changed.wait_until(&mut inner, deadline).timed_out(),
                None => {
                    self.shared.changed.wait(&mut inner);
                    false
                }
            };
        };

        inner.starting = false;
        if let Err(reason) = &outcome {
            inner.state = SessionState::Disconnected;
            inner.session_id = None;
            inner.last_failure = Some(reason.clone());
        }
        drop(inner);
        self.shared.changed.notify_all();
        outcome
    }

    /// Logs out and stops the transport. Safe to call in any state.
    ///
    /// # Errors
    /// Returns the transport's error if stopping fails; the session is
    /// disconnected either way.
    pub fn stop(&self) -> Result<()> {
        {
            let mut inner = self.shared.inner.lock();
            match inner.state {
                SessionState::Disconnected => return Ok(()),
                SessionState::LoggedIn => inner.state = SessionState::LoggingOut,
                SessionState::Connecting | SessionState::LoggingOut => {}
            }
        }
        info!("stopping session");

        let result = self.transport.stop();
        if let Err(err) = &result {
            warn!("transport stop failed: {}", err);
        }
        self.shared.update(|inner| {
            inner.state = SessionState::Disconnected;
            inner.session_id = None;
        });
        result
    }

    /// Assigns an id to `request`, builds it and sends it.
    ///
    /// Nothing is queued or retried.
    ///
    /// # Returns
    /// The assigned ClOrdID or MDReqID.
    ///
    /// # Errors
    /// - `SessionError::NotLoggedIn` unless the session is logged in.
    /// - `SessionError::IdsExhausted` once no greater id can be issued.
    /// - `FixError::Validation` if the request does not build; nothing is sent.
    /// - Any transport error, unchanged.
    pub fn submit(&self, request: impl Into<Request>) -> Result<String> {
        let mut request = request.into();
        let (id, session_id) = {
            let mut inner = self.shared.inner.lock();
            let session_id = match (inner.state, &inner.session_id) {
                (SessionState::LoggedIn, Some(session_id)) => session_id.clone(),
                (state, _) => {
                    return Err(SessionError::NotLoggedIn {
                        state: state.to_string(),
                    }
                    .into());
                }
            };
            let id = inner.ids.next_id().ok_or(SessionError::IdsExhausted)?;
            (id.to_string(), session_id)
        };

        request.set_id(id.as_str());
        let message = request.build()?;
        info!("{}: submitting {}", session_id, request);
        self.transport.send(message, &session_id)?;
        Ok(id)
    }

    /// Registers a handler for inbound events.
    pub fn add_handler(&self, handler: impl EventHandler + 'static) {
        self.shared.handlers.write().push(Arc::new(handler));
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.inner.lock().state
    }

    /// Returns the logged-on session id, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.shared.inner.lock().session_id.clone()
    }

    /// Returns why the last start or session ended in failure.
    #[must_use]
    pub fn last_failure(&self) -> Option<String> {
        self.shared.inner.lock().last_failure.clone()
    }

    /// Returns the last traffic timestamps.
    #[must_use]
    pub fn activity(&self) -> Activity {
        self.shared.inner.lock().activity
    }

    /// Returns the timeout used by [`start`](Self::start).
    #[must_use]
    pub const fn start_timeout(&self) -> Duration {
        self.start_timeout
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("SessionController")
            .field("state", &inner.state)
            .field("session_id", &inner.session_id)
            .field("credential", &self.shared.credential)
            .field("start_timeout", &self.start_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DomainEvent;
    use crate::handler::ChannelHandler;
    use crate::market_data::MarketDataRequest;
    use crate::order::OrderRequest;
    use gatefix_core::error::{FixError, ValidationError};
    use gatefix_core::types::{OrdType, Side};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::thread;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Accept,
        AcceptLater,
        Reject,
        Silent,
        Refuse,
    }

    #[derive(Default)]
    struct MockState {
        app: Mutex<Option<Arc<dyn Application>>>,
        active: Mutex<Option<SessionId>>,
        logons: Mutex<Vec<Message>>,
        sent: Mutex<Vec<Message>>,
        pending_on_stop: Mutex<Vec<Message>>,
        connection: AtomicU64,
        stops: AtomicUsize,
    }

    impl MockState {
        fn app(&self) -> Arc<dyn Application> {
            self.app.lock().clone().expect("transport started")
        }

        fn next_id(&self) -> SessionId {
            let n = self.connection.fetch_add(1, Ordering::SeqCst) + 1;
            SessionId::new("FIX.4.4", "CLIENT", "GATEWAY").with_connection(n)
        }

        fn send_logon(&self, session_id: &SessionId) {
            let app = self.app();
            app.on_create(session_id);
            let mut logon = Message::new("FIX.4.4", &MsgType::Logon);
            app.to_admin(&mut logon, session_id);
            self.logons.lock().push(logon);
        }

        fn logon(&self) -> SessionId {
            let session_id = self.next_id();
            self.send_logon(&session_id);
            *self.active.lock() = Some(session_id.clone());
            self.app().from_admin(&Message::new("FIX.4.4", &MsgType::Logon), &session_id);
            self.app().on_logon(&session_id);
            session_id
        }

        fn force_logout(&self) {
            let active = self.active.lock().take();
            if let Some(session_id) = active {
                self.app().on_logout(&session_id);
            }
        }

        fn deliver(&self, message: &Message) {
            let session_id = self
                .active
                .lock()
                .clone()
                .unwrap_or_else(|| SessionId::new("FIX.4.4", "CLIENT", "GATEWAY"));
            self.app().from_app(message, &session_id);
        }
    }

    struct MockTransport {
        mode: Mode,
        state: Arc<MockState>,
    }

    impl MockTransport {
        fn new(mode: Mode) -> Arc<Self> {
            Arc::new(Self {
                mode,
                state: Arc::new(MockState::default()),
            })
        }
    }

    impl Transport for MockTransport {
        fn start(&self, application: Arc<dyn Application>) -> Result<()> {
            *self.state.app.lock() = Some(application);
            match self.mode {
                Mode::Accept => {
                    self.state.logon();
                }
                Mode::AcceptLater => {
                    let state = Arc::clone(&self.state);
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(50));
                        state.logon();
                    });
                }
                Mode::Reject => {
                    let session_id = self.state.next_id();
                    self.state.send_logon(&session_id);
                    self.state.app().on_logout(&session_id);
                }
                Mode::Silent => {}
                Mode::Refuse => {
                    return Err(SessionError::Connection("connection refused".to_string()).into());
                }
            }
            Ok(())
        }

        fn stop(&self) -> Result<()> {
            self.state.stops.fetch_add(1, Ordering::SeqCst);
            let pending = std::mem::take(&mut *self.state.pending_on_stop.lock());
            for message in &pending {
                self.state.deliver(message);
            }
            self.state.force_logout();
            Ok(())
        }

        fn send(&self, message: Message, session_id: &SessionId) -> Result<()> {
            if self.state.active.lock().as_ref() != Some(session_id) {
                return Err(SessionError::NotConnected.into());
            }
            let mut message = message;
            self.state.app().to_app(&mut message, session_id);
            self.state.sent.lock().push(message);
            Ok(())
        }

        fn is_stopped(&self) -> bool {
            self.state.active.lock().is_none()
        }
    }

    fn new_controller(transport: &Arc<MockTransport>) -> SessionController {
        let mut clock = 1_000u64;
        SessionController::new(
            Arc::clone(transport) as Arc<dyn Transport>,
            Some(Credential::new("s3cret")),
            Vec::new(),
            ClOrdIdGenerator::with_clock(Box::new(move || {
                clock += 10;
                clock
            })),
            Duration::from_secs(2),
        )
    }

    fn order() -> OrderRequest {
        OrderRequest::buy("BTCUSD", Decimal::new(10, 1), Some(Decimal::new(400_000, 1)))
    }

    fn fill() -> Message {
        let mut message = Message::new("FIX.4.4", &MsgType::ExecutionReport);
        message.set(tags::CL_ORD_ID, "1010");
        message.set(tags::ORD_STATUS, "2");
        message
    }

    #[test]
    fn test_submit_before_start() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = new_controller(&transport);
        let err = controller.submit(order()).unwrap_err();
        assert!(matches!(
            err.as_session(),
            Some(SessionError::NotLoggedIn { state }) if state == "Disconnected"
        ));
        assert!(transport.state.sent.lock().is_empty());
    }

    #[test]
    fn test_start_logs_on_with_credential() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = new_controller(&transport);

        let session_id = controller.start().unwrap();
        assert_eq!(session_id.connection, 1);
        assert_eq!(controller.state(), SessionState::LoggedIn);
        assert_eq!(controller.session_id(), Some(session_id));
        assert_eq!(
            transport.state.logons.lock()[0].get(tags::PASSWORD),
            Some("s3cret")
        );

        let activity = controller.activity();
        assert!(activity.last_sent.is_some());
        assert!(activity.last_received.is_some());
    }

    #[test]
    fn test_start_twice() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = new_controller(&transport);
        controller.start().unwrap();

        let err = controller.start().unwrap_err();
        assert!(matches!(
            err.as_session(),
            Some(SessionError::AlreadyStarted { state }) if state == "LoggedIn"
        ));
    }

    #[test]
    fn test_start_waits_for_late_logon() {
        let transport = MockTransport::new(Mode::AcceptLater);
        let controller = new_controller(&transport);
        let session_id = controller.start_within(Duration::from_secs(5)).unwrap();
        assert_eq!(controller.session_id(), Some(session_id));
    }

    #[test]
    fn test_start_times_out() {
        let transport = MockTransport::new(Mode::Silent);
        let controller = new_controller(&transport);

        let err = controller
            .start_within(Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err.as_session(), Some(SessionError::LoginFailed { .. })));
        assert_eq!(controller.state(), SessionState::Disconnected);
        assert_eq!(transport.state.stops.load(Ordering::SeqCst), 1);
        assert!(controller.last_failure().is_some());
    }

    #[test]
    fn test_start_rejected() {
        let transport = MockTransport::new(Mode::Reject);
        let controller = new_controller(&transport);

        let err = controller.start().unwrap_err();
        assert!(matches!(
            err.as_session(),
            Some(SessionError::LoginFailed { reason }) if reason == "logon rejected"
        ));
        assert_eq!(controller.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_transport_start_error_passes_through() {
        let transport = MockTransport::new(Mode::Refuse);
        let controller = new_controller(&transport);

        let err = controller.start().unwrap_err();
        assert!(matches!(err.as_session(), Some(SessionError::Connection(_))));
        assert_eq!(controller.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_submit_assigns_increasing_ids() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = new_controller(&transport);
        controller.start().unwrap();

        let first = controller.submit(order()).unwrap();
        let second = controller
            .submit(MarketDataRequest::for_symbols(["BTCUSD"]))
            .unwrap();
        assert!(second.parse::<u64>().unwrap() > first.parse::<u64>().unwrap());

        let sent = transport.state.sent.lock();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].get(tags::CL_ORD_ID), Some(first.as_str()));
        assert_eq!(sent[0].get(tags::SYMBOL), Some("BTCUSD"));
        assert_eq!(sent[0].get(tags::SIDE), Some("1"));
        assert_eq!(sent[0].get(tags::ORD_TYPE), Some("2"));
        assert_eq!(sent[0].get(tags::ORDER_QTY), Some("1.0"));
        assert_eq!(sent[0].get(tags::PRICE), Some("40000.0"));
        assert_eq!(sent[1].get(tags::MD_REQ_ID), Some(second.as_str()));
    }

    #[test]
    fn test_invalid_request_is_not_sent() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = new_controller(&transport);
        controller.start().unwrap();

        let invalid = OrderRequest::market(Side::Sell, "BTCUSD", Decimal::ZERO);
        let err = controller.submit(invalid).unwrap_err();
        assert!(matches!(
            err,
            FixError::Validation(ValidationError::NonPositiveQuantity { .. })
        ));

        let unpriced = OrderRequest::market(Side::Buy, "BTCUSD", Decimal::ONE)
            .with_ord_type(OrdType::Limit);
        let err = controller.submit(unpriced).unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::LimitPriceRequired)
        );
        assert!(transport.state.sent.lock().is_empty());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = new_controller(&transport);
        controller.start().unwrap();

        controller.stop().unwrap();
        assert_eq!(controller.state(), SessionState::Disconnected);
        assert_eq!(controller.session_id(), None);
        controller.stop().unwrap();
        assert_eq!(transport.state.stops.load(Ordering::SeqCst), 1);

        assert!(controller.submit(order()).is_err());
    }

    #[test]
    fn test_forced_logout_and_relogon() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = new_controller(&transport);
        let first = controller.start().unwrap();

        transport.state.force_logout();
        assert_eq!(controller.state(), SessionState::Connecting);
        assert!(controller.submit(order()).is_err());

        let second = transport.state.logon();
        assert_ne!(first, second);
        assert_eq!(controller.state(), SessionState::LoggedIn);
        assert_eq!(controller.session_id(), Some(second));

        let logons = transport.state.logons.lock();
        assert_eq!(logons.len(), 2);
        assert!(logons.iter().all(|m| m.get(tags::PASSWORD) == Some("s3cret")));
    }

    #[test]
    fn test_engine_give_up_disconnects() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = new_controller(&transport);
        controller.start().unwrap();
        transport.state.force_logout();

        transport
            .state
            .app()
            .on_error(&SessionError::Connection("gave up".to_string()));
        assert_eq!(controller.state(), SessionState::Disconnected);
        assert_eq!(
            controller.last_failure().as_deref(),
            Some("connection error: gave up")
        );
    }

    #[test]
    fn test_events_dispatched_in_every_state() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = new_controller(&transport);
        let (handler, rx) = ChannelHandler::unbounded();
        controller.add_handler(handler);
        let shared = Arc::downgrade(&controller.shared);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let states = Arc::clone(&seen);
        controller.add_handler(move |_: &DomainEvent, _: &SessionId| {
            if let Some(shared) = shared.upgrade() {
                states.lock().push(shared.inner.lock().state);
            }
        });

        controller.start().unwrap();
        transport.state.deliver(&fill());
        transport.state.pending_on_stop.lock().push(fill());
        controller.stop().unwrap();
        transport.state.deliver(&fill());

        assert_eq!(
            *seen.lock(),
            vec![
                SessionState::LoggedIn,
                SessionState::LoggingOut,
                SessionState::Disconnected,
            ]
        );
        let first = rx.try_recv().unwrap();
        assert_eq!(first.session_id.connection, 1);
        assert!(matches!(first.event, DomainEvent::ExecutionReport(_)));
        let during_logout = rx.try_recv().unwrap();
        assert!(matches!(during_logout.event, DomainEvent::ExecutionReport(_)));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_submit_fails_once_ids_exhausted() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = SessionController::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            None,
            Vec::new(),
            ClOrdIdGenerator::with_clock(Box::new(|| u64::MAX)),
            Duration::from_secs(2),
        );
        controller.start().unwrap();

        assert_eq!(controller.submit(order()).unwrap(), u64::MAX.to_string());
        let err = controller.submit(order()).unwrap_err();
        assert_eq!(err.as_session(), Some(&SessionError::IdsExhausted));
        assert_eq!(transport.state.sent.lock().len(), 1);
    }

    #[test]
    fn test_debug_redacts_credential() {
        let transport = MockTransport::new(Mode::Accept);
        let controller = new_controller(&transport);
        let rendered = format!("{:?}", controller);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("REDACTED"));
    }
}
