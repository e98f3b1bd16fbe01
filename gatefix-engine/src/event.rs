/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Domain events decoded from inbound application messages.
//!
//! This module provides:
//! - [`DomainEvent`]: Closed set of events handed to handlers
//! - [`classify`]: Total mapping from a [`Message`] to a [`DomainEvent`]
//!
//! Every field other than the variant itself is optional. Enumerated values
//! outside the known tables are kept as [`WireEnum::Raw`].

use crate::order::Shown;
use gatefix_core::message::{FieldMap, Message, MsgType};
use gatefix_core::tags;
use gatefix_core::types::{ExecType, OrdStatus, OrdType, Side, WireCode, WireEnum};
use rust_decimal::Decimal;
use std::fmt;
use tracing::warn;

/// Order lifecycle report (ExecutionReport and the order-related messages
/// that share its shape).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Message type the report was decoded from.
    pub msg_type: MsgType,
    /// ClOrdID (11).
    pub cl_ord_id: Option<String>,
    /// OrderID (37).
    pub order_id: Option<String>,
    /// ExecID (17).
    pub exec_id: Option<String>,
    /// ExecType (150).
    pub exec_type: Option<WireEnum<ExecType>>,
    /// OrdStatus (39).
    pub ord_status: Option<WireEnum<OrdStatus>>,
    /// Symbol (55).
    pub symbol: Option<String>,
    /// Side (54).
    pub side: Option<WireEnum<Side>>,
    /// OrdType (40).
    pub ord_type: Option<WireEnum<OrdType>>,
    /// OrderQty (38).
    pub quantity: Option<Decimal>,
    /// CumQty (14).
    pub cum_qty: Option<Decimal>,
    /// Price (44).
    pub price: Option<Decimal>,
    /// Text (58).
    pub text: Option<String>,
    /// SenderCompID (49).
    pub sender: Option<String>,
    /// TargetCompID (56).
    pub target: Option<String>,
}

/// Full book snapshot (35=W).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDataSnapshot {
    /// MDReqID (262).
    pub md_req_id: Option<String>,
    /// Symbol (55).
    pub symbol: Option<String>,
    /// Raw NoMDEntries (268) entries, in wire order.
    pub entries: Vec<FieldMap>,
}

/// Refused market data subscription (35=Y).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDataReject {
    /// MDReqID (262).
    pub md_req_id: Option<String>,
    /// MDReqRejReason (281), as received.
    pub reason: Option<String>,
    /// Text (58).
    pub text: Option<String>,
}

/// Free-form news (35=B).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct News {
    /// SenderCompID (49).
    pub sender: Option<String>,
    /// Headline (148).
    pub headline: Option<String>,
    /// Text (58).
    pub text: Option<String>,
}

/// An inbound application message, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    /// Order lifecycle report.
    ExecutionReport(ExecutionReport),
    /// Market data snapshot.
    MarketDataSnapshot(MarketDataSnapshot),
    /// Market data request reject.
    MarketDataReject(MarketDataReject),
    /// News.
    News(News),
    /// Any other message type, or none at all.
    Unknown {
        /// Raw MsgType (35), if present.
        raw_type: Option<String>,
    },
}

impl DomainEvent {
    /// Returns the variant name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ExecutionReport(_) => "ExecutionReport",
            Self::MarketDataSnapshot(_) => "MarketDataSnapshot",
            Self::MarketDataReject(_) => "MarketDataReject",
            Self::News(_) => "News",
            Self::Unknown { .. } => "Unknown",
        }
    }
}

/// Decodes an inbound message into a domain event.
///
/// Never fails: unrecognised types become [`DomainEvent::Unknown`], and
/// decimals that do not parse are reported absent.
#[must_use]
pub fn classify(message: &Message) -> DomainEvent {
    let Some(msg_type) = message.msg_type() else {
        return DomainEvent::Unknown { raw_type: None };
    };

    match msg_type {
        MsgType::News => DomainEvent::News(News {
            sender: header_text(message, tags::SENDER_COMP_ID),
            headline: text(message, tags::HEADLINE),
            text: text(message, tags::TEXT),
        }),
        MsgType::MarketDataRequestReject => DomainEvent::MarketDataReject(MarketDataReject {
            md_req_id: text(message, tags::MD_REQ_ID),
            reason: text(message, tags::MD_REQ_REJ_REASON),
            text: text(message, tags::TEXT),
        }),
        MsgType::MarketDataSnapshotFullRefresh => {
            DomainEvent::MarketDataSnapshot(MarketDataSnapshot {
                md_req_id: text(message, tags::MD_REQ_ID),
                symbol: text(message, tags::SYMBOL),
                entries: message.group(tags::NO_MD_ENTRIES).to_vec(),
            })
        }
        MsgType::ExecutionReport
        | MsgType::NewOrderSingle
        | MsgType::OrderCancelReject
        | MsgType::OrderCancelRequest
        | MsgType::OrderCancelReplaceRequest
        | MsgType::OrderStatusRequest => DomainEvent::ExecutionReport(ExecutionReport {
            cl_ord_id: text(message, tags::CL_ORD_ID),
            order_id: text(message, tags::ORDER_ID),
            exec_id: text(message, tags::EXEC_ID),
            exec_type: code(message, tags::EXEC_TYPE),
            ord_status: code(message, tags::ORD_STATUS),
            symbol: text(message, tags::SYMBOL),
            side: code(message, tags::SIDE),
            ord_type: code(message, tags::ORD_TYPE),
            quantity: decimal(message, tags::ORDER_QTY),
            cum_qty: decimal(message, tags::CUM_QTY),
            price: decimal(message, tags::PRICE),
            text: text(message, tags::TEXT),
            sender: header_text(message, tags::SENDER_COMP_ID),
            target: header_text(message, tags::TARGET_COMP_ID),
            msg_type,
        }),
        other => DomainEvent::Unknown {
            raw_type: Some(other.as_str().to_string()),
        },
    }
}

fn text(message: &Message, tag: u32) -> Option<String> {
    message.get(tag).map(str::to_string)
}

fn header_text(message: &Message, tag: u32) -> Option<String> {
    message.header().get(tag).map(str::to_string)
}

fn code<T: WireCode>(message: &Message, tag: u32) -> Option<WireEnum<T>> {
    message.get(tag).map(WireEnum::from_wire)
}

fn decimal(message: &Message, tag: u32) -> Option<Decimal> {
    match message.body().get_parsed::<Decimal>(tag) {
        Ok(value) => value,
        Err(err) => {
            warn!("dropping unparsable field: {}", err);
            None
        }
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: OrderID={}, ClOrdID={}, OrderStatus={}, Sender={}, Target={}, OrderType={}, \
             Side={}, Quantity={}, Price={}, Symbol={}, ExecutionType={}, ExecutedQuantity={}",
            self.msg_type.name(),
            Shown(&self.order_id),
            Shown(&self.cl_ord_id),
            Shown(&self.ord_status),
            Shown(&self.sender),
            Shown(&self.target),
            Shown(&self.ord_type),
            Shown(&self.side),
            Shown(&self.quantity),
            Shown(&self.price),
            Shown(&self.symbol),
            Shown(&self.exec_type),
            Shown(&self.cum_qty),
        )?;
        if let Some(text) = &self.text {
            write!(f, ", Text={}", text)?;
        }
        Ok(())
    }
}

impl fmt::Display for DomainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionReport(report) => report.fmt(f),
            Self::MarketDataSnapshot(snapshot) => write!(
                f,
                "MarketDataSnapshot: ID={}, Symbol={}, Entries={}",
                Shown(&snapshot.md_req_id),
                Shown(&snapshot.symbol),
                snapshot.entries.len()
            ),
            Self::MarketDataReject(reject) => write!(
                f,
                "MarketDataReject: ID={}, Reason={}, Text={}",
                Shown(&reject.md_req_id),
                Shown(&reject.reason),
                Shown(&reject.text)
            ),
            Self::News(news) => write!(
                f,
                "News: Sender={}, Headline={}, Text={}",
                Shown(&news.sender),
                Shown(&news.headline),
                Shown(&news.text)
            ),
            Self::Unknown { raw_type } => write!(f, "Unknown: MessageType={}", Shown(raw_type)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(msg_type: &MsgType) -> Message {
        let mut message = Message::new("FIX.4.4", msg_type);
        message.header_mut().set(tags::SENDER_COMP_ID, "GATEWAY");
        message.header_mut().set(tags::TARGET_COMP_ID, "CLIENT");
        message
    }

    #[test]
    fn test_classify_fill() {
        let mut msg = message(&MsgType::ExecutionReport);
        msg.set(tags::CL_ORD_ID, "1");
        msg.set(tags::ORDER_ID, "O-1");
        msg.set(tags::EXEC_TYPE, "F");
        msg.set(tags::ORD_STATUS, "2");
        msg.set(tags::SIDE, "1");
        msg.set(tags::ORD_TYPE, "2");
        msg.set(tags::ORDER_QTY, "1.0");
        msg.set(tags::CUM_QTY, "1.0");
        msg.set(tags::PRICE, "40000.0");
        msg.set(tags::SYMBOL, "BTCUSD");

        let DomainEvent::ExecutionReport(report) = classify(&msg) else {
            panic!("expected an execution report");
        };
        assert_eq!(report.msg_type, MsgType::ExecutionReport);
        assert_eq!(report.cl_ord_id.as_deref(), Some("1"));
        assert_eq!(report.exec_type, Some(WireEnum::Known(ExecType::Trade)));
        assert_eq!(report.exec_type.as_ref().map(WireEnum::name), Some("FILLED"));
        assert_eq!(report.ord_status, Some(WireEnum::Known(OrdStatus::Filled)));
        assert_eq!(report.side, Some(WireEnum::Known(Side::Buy)));
        assert_eq!(report.ord_type, Some(WireEnum::Known(OrdType::Limit)));
        assert_eq!(report.cum_qty, Some("1.0".parse().unwrap()));
        assert_eq!(report.sender.as_deref(), Some("GATEWAY"));
        assert_eq!(report.target.as_deref(), Some("CLIENT"));
        assert_eq!(report.text, None);
    }

    #[test]
    fn test_order_related_types_are_reports() {
        for msg_type in [
            MsgType::NewOrderSingle,
            MsgType::OrderCancelReject,
            MsgType::OrderCancelRequest,
            MsgType::OrderCancelReplaceRequest,
            MsgType::OrderStatusRequest,
        ] {
            let event = classify(&message(&msg_type));
            assert_eq!(event.kind(), "ExecutionReport", "{}", msg_type);
        }
    }

    #[test]
    fn test_unknown_codes_are_kept() {
        let mut msg = message(&MsgType::ExecutionReport);
        msg.set(tags::ORD_STATUS, "Z");
        msg.set(tags::SIDE, "7");
        let DomainEvent::ExecutionReport(report) = classify(&msg) else {
            panic!("expected an execution report");
        };
        assert_eq!(report.ord_status, Some(WireEnum::Raw("Z".to_string())));
        assert_eq!(report.side, Some(WireEnum::Raw("7".to_string())));
    }

    #[test]
    fn test_unparsable_decimal_is_absent() {
        let mut msg = message(&MsgType::ExecutionReport);
        msg.set(tags::PRICE, "abc");
        msg.set(tags::ORDER_QTY, "2");
        let DomainEvent::ExecutionReport(report) = classify(&msg) else {
            panic!("expected an execution report");
        };
        assert_eq!(report.price, None);
        assert_eq!(report.quantity, Some(Decimal::TWO));
    }

    #[test]
    fn test_classify_market_data() {
        let mut msg = message(&MsgType::MarketDataSnapshotFullRefresh);
        msg.set(tags::MD_REQ_ID, "9");
        msg.set(tags::SYMBOL, "BTCUSD");
        for (kind, px) in [("0", "100"), ("1", "101")] {
            let mut entry = FieldMap::new();
            entry.set(tags::MD_ENTRY_TYPE, kind);
            entry.set(tags::MD_ENTRY_PX, px);
            msg.add_group_entry(tags::NO_MD_ENTRIES, entry);
        }
        let DomainEvent::MarketDataSnapshot(snapshot) = classify(&msg) else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.md_req_id.as_deref(), Some("9"));
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[1].get(tags::MD_ENTRY_PX), Some("101"));

        let mut msg = message(&MsgType::MarketDataRequestReject);
        msg.set(tags::MD_REQ_ID, "9");
        msg.set(tags::MD_REQ_REJ_REASON, "0");
        assert_eq!(
            classify(&msg),
            DomainEvent::MarketDataReject(MarketDataReject {
                md_req_id: Some("9".to_string()),
                reason: Some("0".to_string()),
                text: None,
            })
        );
    }

    #[test]
    fn test_classify_news_and_unknown() {
        let mut msg = message(&MsgType::News);
        msg.set(tags::HEADLINE, "Halt");
        assert_eq!(
            classify(&msg).to_string(),
            "News: Sender=GATEWAY, Headline=Halt, Text=None"
        );

        let msg = message(&MsgType::Custom("U1".to_string()));
        assert_eq!(
            classify(&msg),
            DomainEvent::Unknown {
                raw_type: Some("U1".to_string())
            }
        );

        assert_eq!(
            classify(&Message::default()),
            DomainEvent::Unknown { raw_type: None }
        );
    }

    #[test]
    fn test_report_display() {
        let mut msg = message(&MsgType::ExecutionReport);
        msg.set(tags::ORDER_ID, "O-1");
        msg.set(tags::EXEC_TYPE, "0");
        msg.set(tags::TEXT, "accepted");
        let line = classify(&msg).to_string();
        assert!(line.starts_with("ExecutionReport: OrderID=O-1, ClOrdID=None"));
        assert!(line.contains("ExecutionType=NEW"));
        assert!(line.ends_with(", Text=accepted"));
    }
}
