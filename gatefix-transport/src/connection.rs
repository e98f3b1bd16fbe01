/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Connection loop driven by the socket initiator.
//!
//! One task owns the socket for the lifetime of a connection: it sends the
//! Logon, answers TestRequests, keeps heartbeats flowing, forwards queued
//! application messages and reports everything through the [`Application`]
//! callbacks. Between connections it applies the reconnect policy.

use crate::codec::FixCodec;
use bytes::BytesMut;
use gatefix_core::error::{DecodeError, FixError, SessionError};
use gatefix_core::field::tags;
use gatefix_core::message::{Message, MsgType};
use gatefix_session::admin;
use gatefix_session::heartbeat::generate_test_req_id;
use gatefix_session::{
    Application, HeartbeatAction, HeartbeatMonitor, SequenceCheck, SequenceNumbers,
    SessionConfig, SessionId,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval, sleep, timeout, timeout_at};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, error, info, warn};

/// An application message queued for a specific session.
#[derive(Debug)]
pub(crate) struct Outbound {
    pub(crate) session_id: SessionId,
    pub(crate) message: Message,
}

/// Everything the loop needs besides its channels.
pub(crate) struct Context {
    pub(crate) config: SessionConfig,
    pub(crate) app: Arc<dyn Application>,
    pub(crate) active: Arc<Mutex<Option<SessionId>>>,
}

/// How one connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Shutdown was requested.
    Shutdown,
    /// The connection was lost or closed; `logged_on` tells whether it ever
    /// reached the logged-on state.
    Dropped { logged_on: bool },
}

/// What to do after handling an inbound message or a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Close,
}

/// Runs connections until shutdown or until the reconnect policy gives up.
pub(crate) async fn run(
    ctx: Context,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut connection: u64 = 0;
    let mut failures: u32 = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }
        connection += 1;
        let session_id = SessionId::new(
            ctx.config.begin_string.as_str(),
            ctx.config.sender_comp_id.as_str(),
            ctx.config.target_comp_id.as_str(),
        )
        .with_connection(connection);

        match connect_and_serve(&ctx, &session_id, &mut outbound, &mut shutdown).await {
            Outcome::Shutdown => break,
            Outcome::Dropped { logged_on: true } => failures = 0,
            Outcome::Dropped { logged_on: false } => failures += 1,
        }

        let max = ctx.config.max_reconnect_attempts;
        if max > 0 && failures >= max {
            error!(
                "giving up on {} after {} consecutive failed attempts",
                ctx.config.address(),
                failures
            );
            ctx.app.on_error(&SessionError::Connection(format!(
                "gave up after {} consecutive failed attempts",
                failures
            )));
            break;
        }

        debug!(
            "reconnecting to {} in {:?}",
            ctx.config.address(),
            ctx.config.reconnect_interval
        );
        tokio::select! {
            _ = sleep(ctx.config.reconnect_interval) => {}
            _ = shutdown.changed() => break,
        }
    }
    *ctx.active.lock() = None;
    info!("initiator for {} stopped", ctx.config.address());
}

async fn connect_and_serve(
    ctx: &Context,
    session_id: &SessionId,
    outbound: &mut mpsc::UnboundedReceiver<Outbound>,
    shutdown: &mut watch::Receiver<bool>,
) -> Outcome {
    let address = ctx.config.address();
    let stream = tokio::select! {
        connected = timeout(ctx.config.connect_timeout, TcpStream::connect(&address)) => connected,
        _ = shutdown.changed() => return Outcome::Shutdown,
    };
    let stream = match stream {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            warn!("connect to {} failed: {}", address, e);
            return Outcome::Dropped { logged_on: false };
        }
        Err(_) => {
            warn!("connect to {} timed out", address);
            return Outcome::Dropped { logged_on: false };
        }
    };
    if let Err(e) = stream.set_nodelay(true) {
        debug!("set_nodelay failed: {}", e);
    }
    info!("connected to {} as {}", address, session_id);

    let (reader, writer) = stream.into_split();
    let mut link = Link::new(ctx, session_id.clone(), writer);
    let outcome = link.serve(reader, outbound, shutdown).await;
    link.finish();
    outcome
}

/// Write side and protocol state of one connection.
struct Link<'a> {
    ctx: &'a Context,
    session_id: SessionId,
    writer: OwnedWriteHalf,
    codec: FixCodec,
    out_buf: BytesMut,
    seq: SequenceNumbers,
    heartbeat: HeartbeatMonitor,
    logged_on: bool,
    logout_sent: bool,
    logout_received: bool,
}

impl<'a> Link<'a> {
    fn new(ctx: &'a Context, session_id: SessionId, writer: OwnedWriteHalf) -> Self {
        Self {
            ctx,
            session_id,
            writer,
            codec: FixCodec::new()
                .with_max_message_size(ctx.config.max_message_size)
                .with_checksum_validation(ctx.config.validate_checksum),
            out_buf: BytesMut::with_capacity(512),
            seq: SequenceNumbers::new(),
            heartbeat: HeartbeatMonitor::new(ctx.config.heartbeat_interval),
            logged_on: false,
            logout_sent: false,
            logout_received: false,
        }
    }

    async fn serve(
        &mut self,
        mut reader: OwnedReadHalf,
        outbound: &mut mpsc::UnboundedReceiver<Outbound>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Outcome {
        let mut read_buf = BytesMut::with_capacity(4096);
        self.ctx.app.on_create(&self.session_id);
        if let Err(e) = self.send_admin(admin::logon(&self.ctx.config)).await {
            warn!("{}: failed to send logon: {}", self.session_id, e);
            return self.dropped();
        }

        let logon_deadline = Instant::now() + self.ctx.config.logon_timeout;
        let mut tick = interval(tick_period(&self.ctx.config));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                read = reader.read_buf(&mut read_buf) => {
                    match read {
                        Ok(0) => {
                            warn!("{}: connection closed by counterparty", self.session_id);
                            return self.dropped();
                        }
                        Ok(_) => {
                            if self.drain(&mut read_buf).await == Flow::Close {
                                return self.dropped();
                            }
                        }
                        Err(e) => {
                            warn!("{}: read failed: {}", self.session_id, e);
                            return self.dropped();
                        }
                    }
                }
                Some(queued) = outbound.recv(), if self.logged_on => {
                    if queued.session_id != self.session_id {
                        warn!("dropping message queued for stale session {}", queued.session_id);
                        continue;
                    }
                    if let Err(e) = self.send_app(queued.message).await {
                        if matches!(e, FixError::Encode(_)) {
                            error!("{}: dropping unencodable message: {}", self.session_id, e);
                            continue;
                        }
                        warn!("{}: write failed: {}", self.session_id, e);
                        return self.dropped();
                    }
                }
                _ = tick.tick() => {
                    if !self.logged_on && Instant::now() >= logon_deadline {
                        warn!("{}: logon not acknowledged within {:?}", self.session_id, self.ctx.config.logon_timeout);
                        return self.dropped();
                    }
                    if self.on_tick().await == Flow::Close {
                        return self.dropped();
                    }
                }
                _ = shutdown.changed() => {
                    self.logout(&mut reader, &mut read_buf).await;
                    return Outcome::Shutdown;
                }
            }
        }
    }

    /// Decodes and handles every complete frame in `read_buf`.
    async fn drain(&mut self, read_buf: &mut BytesMut) -> Flow {
        loop {
            match self.codec.decode(read_buf) {
                Ok(Some(message)) => {
                    if self.on_inbound(message).await == Flow::Close {
                        return Flow::Close;
                    }
                }
                Ok(None) => return Flow::Continue,
                Err(FixError::Decode(e)) if !is_framing_error(&e) => {
                    warn!("{}: discarding undecodable message: {}", self.session_id, e);
                }
                Err(e) => {
                    warn!("{}: unrecoverable framing error: {}", self.session_id, e);
                    return Flow::Close;
                }
            }
        }
    }

    async fn on_inbound(&mut self, message: Message) -> Flow {
        debug!("{} <- {}", self.session_id, message);
        let msg_type = message.msg_type();
        let is_heartbeat = msg_type == Some(MsgType::Heartbeat);
        self.heartbeat
            .on_message_received(is_heartbeat, message.get(tags::TEST_REQ_ID));

        match message.header().get_parsed::<u64>(tags::MSG_SEQ_NUM) {
            Ok(Some(received)) => match self.seq.check_incoming(received) {
                SequenceCheck::InOrder => {}
                SequenceCheck::Gap { expected, received } => warn!(
                    "{}: sequence gap, expected {} received {}",
                    self.session_id, expected, received
                ),
                SequenceCheck::TooLow { expected, received } => warn!(
                    "{}: sequence too low, expected {} received {}",
                    self.session_id, expected, received
                ),
            },
            Ok(None) => warn!("{}: inbound message without MsgSeqNum", self.session_id),
            Err(e) => warn!("{}: {}", self.session_id, e),
        }

        let Some(msg_type) = msg_type else {
            self.ctx.app.from_app(&message, &self.session_id);
            return Flow::Continue;
        };
        if !msg_type.is_admin() {
            self.ctx.app.from_app(&message, &self.session_id);
            return Flow::Continue;
        }

        self.ctx.app.from_admin(&message, &self.session_id);
        match msg_type {
            MsgType::Logon => {
                if !self.logged_on {
                    self.logged_on = true;
                    self.heartbeat.reset();
                    *self.ctx.active.lock() = Some(self.session_id.clone());
                    info!("{}: logon acknowledged", self.session_id);
                    self.ctx.app.on_logon(&self.session_id);
                }
                Flow::Continue
            }
            MsgType::TestRequest => {
                let reply = admin::heartbeat(
                    &self.session_id.begin_string,
                    message.get(tags::TEST_REQ_ID),
                );
                match self.send_admin(reply).await {
                    Ok(()) => Flow::Continue,
                    Err(e) => {
                        warn!("{}: heartbeat reply failed: {}", self.session_id, e);
                        Flow::Close
                    }
                }
            }
            MsgType::Logout => {
                self.logout_received = true;
                let text = message.get(tags::TEXT).unwrap_or("");
                if self.logout_sent {
                    info!("{}: logout acknowledged", self.session_id);
                } else {
                    warn!("{}: logout received: {}", self.session_id, text);
                    if let Err(e) = self
                        .send_admin(admin::logout(&self.session_id.begin_string, None))
                        .await
                    {
                        debug!("{}: logout reply failed: {}", self.session_id, e);
                    }
                }
                Flow::Close
            }
            MsgType::Reject => {
                warn!(
                    "{}: session reject for seq {}: {}",
                    self.session_id,
                    message.get(tags::REF_SEQ_NUM).unwrap_or("?"),
                    message.get(tags::TEXT).unwrap_or("")
                );
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    async fn on_tick(&mut self) -> Flow {
        if !self.logged_on {
            return Flow::Continue;
        }
        let result = match self.heartbeat.poll() {
            HeartbeatAction::Idle => Ok(()),
            HeartbeatAction::SendHeartbeat => {
                self.send_admin(admin::heartbeat(&self.session_id.begin_string, None))
                    .await
            }
            HeartbeatAction::SendTestRequest => {
                let id = generate_test_req_id();
                let probe = admin::test_request(&self.session_id.begin_string, &id);
                let sent = self.send_admin(probe).await;
                self.heartbeat.on_test_request_sent(id);
                sent
            }
            HeartbeatAction::TimedOut => {
                warn!(
                    "{}: no response to test request, last message {:?} ago",
                    self.session_id,
                    self.heartbeat.time_since_last_received()
                );
                return Flow::Close;
            }
        };
        match result {
            Ok(()) => Flow::Continue,
            Err(e) => {
                warn!("{}: heartbeat failed: {}", self.session_id, e);
                Flow::Close
            }
        }
    }

    /// Sends Logout and waits up to the logout timeout for the reply.
    async fn logout(&mut self, reader: &mut OwnedReadHalf, read_buf: &mut BytesMut) {
        if !self.logged_on {
            return;
        }
        self.logout_sent = true;
        if let Err(e) = self
            .send_admin(admin::logout(&self.session_id.begin_string, None))
            .await
        {
            warn!("{}: failed to send logout: {}", self.session_id, e);
            return;
        }

        let deadline = Instant::now() + self.ctx.config.logout_timeout;
        while !self.logout_received {
            match timeout_at(deadline, reader.read_buf(read_buf)).await {
                Err(_) => {
                    warn!("{}: logout not acknowledged in time", self.session_id);
                    return;
                }
                Ok(Ok(0)) | Ok(Err(_)) => return,
                Ok(Ok(_)) => {
                    if self.drain(read_buf).await == Flow::Close {
                        return;
                    }
                }
            }
        }
    }

    async fn send_admin(&mut self, mut message: Message) -> Result<(), FixError> {
        self.ctx.app.to_admin(&mut message, &self.session_id);
        self.write(message).await
    }

    async fn send_app(&mut self, mut message: Message) -> Result<(), FixError> {
        self.ctx.app.to_app(&mut message, &self.session_id);
        self.write(message).await
    }

    async fn write(&mut self, mut message: Message) -> Result<(), FixError> {
        admin::stamp_header(&mut message, &self.session_id, self.seq.allocate_outgoing());
        self.out_buf.clear();
        self.codec.encode(&message, &mut self.out_buf)?;
        self.writer.write_all(&self.out_buf).await?;
        self.heartbeat.on_message_sent();
        debug!("{} -> {}", self.session_id, message);
        Ok(())
    }

    fn dropped(&self) -> Outcome {
        Outcome::Dropped {
            logged_on: self.logged_on,
        }
    }

    /// Clears the active session and reports the end of a logged-on session
    /// or a refused Logon.
    fn finish(&self) {
        *self.ctx.active.lock() = None;
        if self.logged_on || self.logout_received {
            info!("{}: logged out", self.session_id);
            self.ctx.app.on_logout(&self.session_id);
        }
    }
}

/// Framing errors leave the read buffer unusable.
fn is_framing_error(err: &DecodeError) -> bool {
    matches!(
        err,
        DecodeError::InvalidBeginString
            | DecodeError::MissingBodyLength
            | DecodeError::InvalidBodyLength
            | DecodeError::MessageTooLarge { .. }
    )
}

fn tick_period(config: &SessionConfig) -> Duration {
    Duration::from_secs(1)
        .min(config.heartbeat_interval / 2)
        .min(config.logon_timeout / 2)
        .max(Duration::from_millis(10))
}
