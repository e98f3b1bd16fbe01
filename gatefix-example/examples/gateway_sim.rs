/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! FIX 4.4 gateway simulator.
//!
//! Acknowledges logons, answers test requests, fills every order
//! immediately and answers market data requests with a fixed book.

use anyhow::Result;
use bytes::BytesMut;
use gatefix_core::{
    BEGIN_STRING_FIX44, ExecType, FieldMap, MdEntryType, Message, MsgType, OrdStatus, SeqNum,
    WireCode, tags,
};
use gatefix_session::{SessionId, admin};
use gatefix_tagvalue::Encoder;
use gatefix_transport::FixCodec;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Decoder;
use tracing::{error, info, warn};

mod common;
use common::{gateway_addr, init_logging};

/// Outbound side of one connection.
struct Outbox {
    session_id: SessionId,
    seq: SeqNum,
}

impl Outbox {
    fn frame(&mut self, mut message: Message) -> Result<BytesMut> {
        admin::stamp_header(&mut message, &self.session_id, self.seq);
        self.seq = self.seq.next();
        Ok(Encoder::encode(&message)?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let addr = gateway_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("gateway simulator listening on {}", addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("connection from {}", peer);
        tokio::spawn(async move {
            if let Err(e) = handle(socket).await {
                error!("{}: {}", peer, e);
            }
        });
    }
}

async fn handle(mut sock: TcpStream) -> Result<()> {
    let mut codec = FixCodec::new();
    let mut buf = BytesMut::with_capacity(4096);
    let mut outbox: Option<Outbox> = None;
    let mut orders = 0u64;

    loop {
        if sock.read_buf(&mut buf).await? == 0 {
            info!("client disconnected");
            return Ok(());
        }

        while let Some(message) = codec.decode(&mut buf)? {
            let Some(msg_type) = message.msg_type() else {
                continue;
            };
            info!("received {}", message);

            let replies = match &msg_type {
                MsgType::Logon => {
                    let session_id = SessionId::new(
                        message.begin_string().unwrap_or(BEGIN_STRING_FIX44),
                        message.header().get(tags::TARGET_COMP_ID).unwrap_or("GATEWAY"),
                        message.header().get(tags::SENDER_COMP_ID).unwrap_or("CLIENT"),
                    );
                    outbox = Some(Outbox {
                        session_id,
                        seq: SeqNum::default(),
                    });
                    let mut ack = Message::new(BEGIN_STRING_FIX44, &MsgType::Logon);
                    ack.set(tags::ENCRYPT_METHOD, "0");
                    ack.set(
                        tags::HEART_BT_INT,
                        message.get(tags::HEART_BT_INT).unwrap_or("30"),
                    );
                    vec![ack]
                }
                MsgType::TestRequest => vec![admin::heartbeat(
                    BEGIN_STRING_FIX44,
                    message.get(tags::TEST_REQ_ID),
                )],
                MsgType::Logout => vec![admin::logout(BEGIN_STRING_FIX44, None)],
                MsgType::Heartbeat => Vec::new(),
                MsgType::NewOrderSingle => {
                    orders += 1;
                    vec![
                        execution_report(&message, orders, ExecType::New, OrdStatus::New),
                        execution_report(&message, orders, ExecType::Trade, OrdStatus::Filled),
                    ]
                }
                MsgType::MarketDataRequest => snapshots(&message),
                other => {
                    warn!("unhandled message type {}", other.name());
                    Vec::new()
                }
            };

            let Some(out) = outbox.as_mut() else {
                warn!("{} before logon, ignored", msg_type.name());
                continue;
            };
            for reply in replies {
                sock.write_all(&out.frame(reply)?).await?;
            }
            if msg_type == MsgType::Logout {
                info!("client logged out");
                return Ok(());
            }
        }
    }
}

fn execution_report(order: &Message, n: u64, exec_type: ExecType, status: OrdStatus) -> Message {
    let mut report = Message::new(BEGIN_STRING_FIX44, &MsgType::ExecutionReport);
    report.set(tags::ORDER_ID, format!("SIM-{}", n));
    report.set(tags::EXEC_ID, format!("SIM-{}-{}", n, exec_type.code()));
    report.body_mut().set_char(tags::EXEC_TYPE, exec_type.code());
    report.body_mut().set_char(tags::ORD_STATUS, status.code());
    for tag in [
        tags::CL_ORD_ID,
        tags::SYMBOL,
        tags::SIDE,
        tags::ORDER_QTY,
        tags::ORD_TYPE,
        tags::PRICE,
    ] {
        if let Some(value) = order.get(tag) {
            report.set(tag, value);
        }
    }

    let quantity = order.get(tags::ORDER_QTY).unwrap_or("0");
    let (cum_qty, leaves_qty) = if status == OrdStatus::Filled {
        (quantity, "0")
    } else {
        ("0", quantity)
    };
    report.set(tags::CUM_QTY, cum_qty);
    report.set(tags::LEAVES_QTY, leaves_qty);
    report
}

fn snapshots(request: &Message) -> Vec<Message> {
    let book = [
        (MdEntryType::Bid, "1.0850", "1000000"),
        (MdEntryType::Offer, "1.0852", "750000"),
        (MdEntryType::Trade, "1.0851", "250000"),
    ];

    request
        .group(tags::NO_RELATED_SYM)
        .iter()
        .filter_map(|entry| entry.get(tags::SYMBOL))
        .map(|symbol| {
            let mut snapshot =
                Message::new(BEGIN_STRING_FIX44, &MsgType::MarketDataSnapshotFullRefresh);
            if let Some(id) = request.get(tags::MD_REQ_ID) {
                snapshot.set(tags::MD_REQ_ID, id);
            }
            snapshot.set(tags::SYMBOL, symbol);
            for (entry_type, px, size) in book {
                let mut entry = FieldMap::new();
                entry.set_char(tags::MD_ENTRY_TYPE, entry_type.code());
                entry.set(tags::MD_ENTRY_PX, px);
                entry.set(tags::MD_ENTRY_SIZE, size);
                snapshot.add_group_entry(tags::NO_MD_ENTRIES, entry);
            }
            snapshot
        })
        .collect()
}
